//! Main runner for an error-log export

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use errlog_core::{FileSink, ProgressContext, TextFetcher, cleanup_tmp_files, fmt_num};
use url::Url;

use crate::config::Config;
use crate::document::ErrorDecoder;
use crate::error::ExportError;
use crate::index::load_index;
use crate::pipeline::{OUTPUT_PREFIX, fetch_entries, output_file_name};

/// Per-entry progress record
#[derive(Debug)]
pub struct EntryReport<'a> {
    /// 1-based position in the index
    pub index: usize,
    pub total: usize,
    pub url: &'a Url,
    pub kind: &'a str,
    pub message: &'a str,
    pub path: &'a Path,
}

/// Export run summary
#[derive(Debug)]
pub struct Summary {
    pub total: usize,
    pub exported: usize,
    pub elapsed: Duration,
}

/// Export every index entry to `config.output_dir`.
///
/// Entries are processed one at a time in index order. The first error
/// aborts the run; files already written are left in place.
pub fn run<F, D>(
    config: &Config,
    fetcher: &F,
    decoder: &D,
    progress: &ProgressContext,
    mut on_entry: impl FnMut(&EntryReport<'_>),
) -> Result<Summary, ExportError>
where
    F: TextFetcher,
    D: ErrorDecoder,
{
    let start = Instant::now();

    let mut sink =
        FileSink::create(&config.output_dir).map_err(write_error(&config.output_dir))?;
    cleanup_tmp_files(sink.dir(), OUTPUT_PREFIX).map_err(write_error(&config.output_dir))?;

    let mut entries = load_index(fetcher, &config.index_url)?;
    if let Some(limit) = config.max_entries {
        entries.truncate(limit);
    }
    let total = entries.len();

    // Restored on every exit path below
    let status = progress.status_line("export");

    for (i, fetched) in fetch_entries(&entries, fetcher, decoder).enumerate() {
        let fetched = fetched?;
        let index = i + 1;
        status.set(&format!("Error {} of {}", fmt_num(index), fmt_num(total)));

        let filename = output_file_name(&fetched.primary_location);
        let path = sink
            .write(&filename, &fetched.raw_body)
            .map_err(write_error(config.output_dir.join(&filename)))?;
        log::debug!("Wrote {}", path.display());

        if !config.silent {
            on_entry(&EntryReport {
                index,
                total,
                url: &fetched.primary_location,
                kind: fetched.decoded.kind(),
                message: fetched.decoded.message(),
                path: &path,
            });
        }
    }

    let summary = Summary {
        total,
        exported: sink.written(),
        elapsed: start.elapsed(),
    };

    log::info!(
        "Exported {}/{} errors to {} in {:.1}s",
        fmt_num(summary.exported),
        fmt_num(summary.total),
        config.output_dir.display(),
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}

fn write_error(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ExportError {
    let path = path.into();
    move |source| ExportError::Write { path, source }
}
