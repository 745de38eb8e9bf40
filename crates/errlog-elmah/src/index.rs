//! ELMAH error index (CSV) ingestion
//!
//! The log handler serves its index as comma-separated text with a header
//! row. Only the `URL` column (entry page) is required; `XMLREF` (direct
//! link to the XML document) is optional and resolved later when missing.

use csv::{ReaderBuilder, StringRecord};
use errlog_core::TextFetcher;
use url::Url;

use crate::error::{ExportError, IndexError};
use crate::schema::{BoundRows, ColumnSpec};

pub const URL_COLUMN: &str = "URL";
pub const XMLREF_COLUMN: &str = "XMLREF";

/// One row of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Human-readable entry page
    pub primary_location: Url,
    /// Direct link to the XML document, when the index carries one
    pub detail_reference: Option<Url>,
}

/// Declared index columns, in projection order
pub fn index_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::required(URL_COLUMN),
        ColumnSpec::optional(XMLREF_COLUMN),
    ]
}

/// Location of the CSV index for a log handler home URL.
///
/// Local files are the index itself. Remote handlers serve it under
/// `<home>/download`.
pub fn download_location(home: &Url) -> Url {
    if home.scheme() == "file" || home.path().ends_with("/download") {
        return home.clone();
    }
    let mut url = home.clone();
    let path = format!("{}/download", home.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}

/// Fetch the index text and parse it into entries.
pub fn load_index<F: TextFetcher>(
    fetcher: &F,
    location: &Url,
) -> Result<Vec<IndexEntry>, ExportError> {
    log::info!("Fetching error index from {location}");
    let text = fetcher.get(location)?;
    let entries = parse_index(&text)?;
    log::info!("Found {} entries in index", entries.len());
    Ok(entries)
}

/// Parse CSV index text.
///
/// Empty input or a header without data rows yields no entries.
pub fn parse_index(text: &str) -> Result<Vec<IndexEntry>, IndexError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()?;

    // Data rows start after the header
    let mut lines = records
        .iter()
        .skip(1)
        .map(|r| r.position().map_or(0, |p| p.line()));

    let rows = records
        .iter()
        .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>());
    let mut bound = BoundRows::new(rows, index_columns());

    let mut entries = Vec::new();
    while let Some(result) = bound.next() {
        let values = match result {
            Ok(values) => values,
            Err(e) if bound.binding().is_none() => return Err(IndexError::Header(e)),
            Err(source) => {
                return Err(IndexError::Row {
                    line: lines.next().unwrap_or(0),
                    source,
                });
            }
        };
        let line = lines.next().unwrap_or(0);

        let mut values = values.into_iter();
        let url = parse_cell(values.next().flatten(), line, URL_COLUMN)?
            .ok_or(IndexError::EmptyUrl { line })?;
        let xmlref = parse_cell(values.next().flatten(), line, XMLREF_COLUMN)?;

        entries.push(IndexEntry {
            primary_location: url,
            detail_reference: xmlref,
        });
    }

    Ok(entries)
}

/// Interpret a bound cell as an absolute URL; blank means no value.
fn parse_cell(
    value: Option<String>,
    line: u64,
    column: &'static str,
) -> Result<Option<Url>, IndexError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Url::parse(value)
        .map(Some)
        .map_err(|source| IndexError::InvalidUrl {
            line,
            column,
            value: value.to_string(),
            source,
        })
}
