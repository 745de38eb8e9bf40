//! Errlog Core - Common infrastructure for error-log exporters
//!
//! This crate provides the reusable pieces around an export run:
//! fetching text over HTTP or from disk, writing output files,
//! and logging/status display.

pub mod error;
pub mod fetch;
pub mod logging;
pub mod progress;
pub mod sink;

// Re-exports for convenience
pub use error::FetchError;
pub use fetch::{HttpConfig, HttpFetcher, SHARED_RUNTIME, TextFetcher, read_local};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, StatusLine, fmt_num};
pub use sink::{FileSink, cleanup_tmp_files};
