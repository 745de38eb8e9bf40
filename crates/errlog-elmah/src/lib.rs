//! Errlog ELMAH - error log export pipeline
//!
//! Mirrors an ELMAH error log to local files: reads the CSV index,
//! resolves each entry's XML document, fetches it and writes it verbatim.
//!
//! # Example
//!
//! ```ignore
//! use errlog_core::{HttpConfig, HttpFetcher, ProgressContext};
//! use errlog_elmah::{Config, ElmahXmlDecoder, download_location, run};
//!
//! let home = url::Url::parse("https://example.com/elmah.axd")?;
//! let config = Config {
//!     output_dir: "errors".into(),
//!     ..Config::new(download_location(&home))
//! };
//! let fetcher = HttpFetcher::new(&HttpConfig::default())?;
//!
//! let summary = run(&config, &fetcher, &ElmahXmlDecoder, &ProgressContext::new(), |r| {
//!     println!("{} of {}: {}", r.index, r.total, r.kind);
//! })?;
//! println!("Exported {} errors", summary.exported);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod resolver;
pub mod runner;
pub mod schema;

#[cfg(test)]
mod testing;

// Re-exports
pub use config::Config;
pub use document::{ElmahXmlDecoder, ErrorDecoder, ErrorDocument};
pub use error::{ExportError, IndexError, ResolutionError};
pub use index::{IndexEntry, download_location, load_index, parse_index};
pub use pipeline::{
    FetchedEntries, FetchedEntry, OUTPUT_PREFIX, fetch_entries, output_file_name, sanitize,
};
pub use resolver::Resolver;
pub use runner::{EntryReport, Summary, run};
pub use schema::{BoundRows, ColumnBinding, ColumnSpec, SchemaError, bind};
