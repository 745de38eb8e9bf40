//! Export run configuration

use std::path::PathBuf;

use url::Url;

/// Runtime configuration for one export run
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the CSV index (see [`crate::index::download_location`])
    pub index_url: Url,
    /// Directory receiving one `error-*.xml` per entry
    pub output_dir: PathBuf,
    /// Suppress per-entry reports
    pub silent: bool,
    /// Maximum entries to export (for testing)
    pub max_entries: Option<usize>,
}

impl Config {
    pub fn new(index_url: Url) -> Self {
        Self {
            index_url,
            output_dir: PathBuf::from("."),
            silent: false,
            max_entries: None,
        }
    }
}
