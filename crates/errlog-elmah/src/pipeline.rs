//! Lazy resolve → fetch → decode over index entries

use url::Url;

use errlog_core::TextFetcher;

use crate::document::{ErrorDecoder, ErrorDocument};
use crate::error::{ExportError, ResolutionError};
use crate::index::IndexEntry;
use crate::resolver::Resolver;

/// An index entry with its XML document fetched and decoded
#[derive(Debug, Clone)]
pub struct FetchedEntry {
    pub primary_location: Url,
    pub resolved_detail_location: Url,
    pub decoded: ErrorDocument,
    /// Document text exactly as served
    pub raw_body: String,
}

/// Sequential iterator doing one resolve+fetch per `next()`.
///
/// Nothing is fetched ahead of the consumer. After the first error the
/// iterator is exhausted.
pub struct FetchedEntries<'a, F, D> {
    entries: std::slice::Iter<'a, IndexEntry>,
    resolver: Resolver<&'a F>,
    decoder: &'a D,
    failed: bool,
}

pub fn fetch_entries<'a, F, D>(
    entries: &'a [IndexEntry],
    fetcher: &'a F,
    decoder: &'a D,
) -> FetchedEntries<'a, F, D>
where
    F: TextFetcher,
    D: ErrorDecoder,
{
    FetchedEntries {
        entries: entries.iter(),
        resolver: Resolver::new(fetcher),
        decoder,
        failed: false,
    }
}

impl<F: TextFetcher, D: ErrorDecoder> FetchedEntries<'_, F, D> {
    fn fetch_one(&self, entry: &IndexEntry) -> Result<FetchedEntry, ExportError> {
        let detail = self
            .resolver
            .resolve(&entry.primary_location, entry.detail_reference.as_ref())?
            .ok_or_else(|| ResolutionError::NotFound {
                page: entry.primary_location.clone(),
            })?;

        log::debug!("Fetching {detail}");
        let raw_body = self.resolver.fetcher().get(&detail)?;
        let decoded = self.decoder.decode(&raw_body)?;

        Ok(FetchedEntry {
            primary_location: entry.primary_location.clone(),
            resolved_detail_location: detail,
            decoded,
            raw_body,
        })
    }
}

impl<F: TextFetcher, D: ErrorDecoder> Iterator for FetchedEntries<'_, F, D> {
    type Item = Result<FetchedEntry, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let entry = self.entries.next()?;
        let result = self.fetch_one(entry);
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.entries.len()))
        }
    }
}

/// Replace everything outside `[A-Za-z0-9-]` with `-`, collapsing runs of `-`.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Prefix shared by every exported file name
pub const OUTPUT_PREFIX: &str = "error-";

/// Output file name for an entry: `error-<sanitized url>.xml`
pub fn output_file_name(primary_location: &Url) -> String {
    format!("{OUTPUT_PREFIX}{}.xml", sanitize(primary_location.as_str()))
}
