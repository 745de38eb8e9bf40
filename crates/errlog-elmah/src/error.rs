//! Error taxonomy for an export run
//!
//! Every variant is fatal: the run stops at the first error and keeps
//! whatever files were already written.

use std::path::PathBuf;

use errlog_core::FetchError;
use url::Url;

use crate::schema::SchemaError;

/// Failure while reading the CSV index
#[derive(Debug)]
pub enum IndexError {
    Csv(csv::Error),
    /// Header row does not fit the declared columns
    Header(SchemaError),
    /// Data row does not fit the header binding
    Row { line: u64, source: SchemaError },
    EmptyUrl { line: u64 },
    InvalidUrl {
        line: u64,
        column: &'static str,
        value: String,
        source: url::ParseError,
    },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "malformed index: {e}"),
            Self::Header(e) => write!(f, "index header: {e}"),
            Self::Row { line, source } => write!(f, "index line {line}: {source}"),
            Self::EmptyUrl { line } => write!(f, "index line {line}: empty URL"),
            Self::InvalidUrl {
                line,
                column,
                value,
                source,
            } => write!(
                f,
                "index line {line}: {column} '{value}' is not an absolute URL ({source})"
            ),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(e) => Some(e),
            Self::Header(e) => Some(e),
            Self::Row { source, .. } => Some(source),
            Self::InvalidUrl { source, .. } => Some(source),
            Self::EmptyUrl { .. } => None,
        }
    }
}

impl From<csv::Error> for IndexError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Failure to locate an entry's detail document
#[derive(Debug)]
pub enum ResolutionError {
    /// Primary page has no alternate XML link
    NotFound { page: Url },
    /// Link found but its href cannot be resolved against the page
    InvalidReference {
        href: String,
        base: Url,
        source: url::ParseError,
    },
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { page } => {
                write!(f, "no XML alternate link found on {page}")
            }
            Self::InvalidReference { href, base, source } => {
                write!(f, "cannot resolve '{href}' against {base}: {source}")
            }
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::InvalidReference { source, .. } => Some(source),
        }
    }
}

/// Error that aborts an export run.
#[derive(Debug)]
pub enum ExportError {
    Index(IndexError),
    Resolution(ResolutionError),
    Fetch(FetchError),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(_) => write!(f, "cannot load error index"),
            Self::Resolution(_) => write!(f, "cannot locate error document"),
            Self::Fetch(_) => write!(f, "request failed"),
            Self::Write { path, .. } => write!(f, "cannot write {}", path.display()),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Index(e) => Some(e),
            Self::Resolution(e) => Some(e),
            Self::Fetch(e) => Some(e),
            Self::Write { source, .. } => Some(source),
        }
    }
}

impl From<IndexError> for ExportError {
    fn from(e: IndexError) -> Self {
        Self::Index(e)
    }
}

impl From<ResolutionError> for ExportError {
    fn from(e: ResolutionError) -> Self {
        Self::Resolution(e)
    }
}

impl From<FetchError> for ExportError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error::Error;

    fn chain(err: &dyn Error) -> Vec<String> {
        let mut messages = vec![err.to_string()];
        let mut next = err.source();
        while let Some(e) = next {
            messages.push(e.to_string());
            next = e.source();
        }
        messages
    }

    #[test]
    fn display_not_found() {
        let page = Url::parse("http://h/elmah.axd/detail?id=1").unwrap();
        let err = ExportError::from(ResolutionError::NotFound { page });
        assert_eq!(
            chain(&err),
            vec![
                "cannot locate error document",
                "no XML alternate link found on http://h/elmah.axd/detail?id=1",
            ]
        );
    }

    #[test]
    fn header_error_chain_keeps_every_level() {
        let err = ExportError::from(IndexError::Header(SchemaError::MissingColumn {
            name: "URL".to_string(),
        }));
        assert_eq!(
            chain(&err),
            vec![
                "cannot load error index",
                "index header: missing required column 'URL'",
                "missing required column 'URL'",
            ]
        );
    }

    #[test]
    fn display_row_error_has_line() {
        let err = IndexError::Row {
            line: 3,
            source: SchemaError::RowTooShort {
                column: "URL".to_string(),
                index: 2,
                len: 1,
            },
        };
        assert!(err.to_string().starts_with("index line 3:"));
    }

    #[test]
    fn display_write_error() {
        let err = ExportError::Write {
            path: PathBuf::from("out/error-x.xml"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(
            chain(&err),
            vec!["cannot write out/error-x.xml", "disk full"]
        );
    }

    #[test]
    fn fetch_error_converts() {
        let err: ExportError = FetchError::Decode("no root".to_string()).into();
        assert!(matches!(err, ExportError::Fetch(FetchError::Decode(_))));
    }
}
