//! Error type for fetching and decoding remote documents

use std::time::Duration;

/// Error from fetching a single document (network, local file, or decode).
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },
    /// Local file read failure
    Io {
        path: String,
        source: std::io::Error,
    },
    /// No complete response within the per-fetch timeout
    Timeout { url: String, after: Duration },
    /// Fetched text is not a valid document
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport {
                url,
                status: Some(s),
                message,
            } => write!(f, "HTTP {s} from {url}: {message}"),
            Self::Transport {
                url,
                status: None,
                message,
            } => write!(f, "HTTP error from {url}: {message}"),
            Self::Io { path, source } => write!(f, "IO error reading {path}: {source}"),
            Self::Timeout { url, after } => {
                write!(f, "timed out after {}s fetching {url}", after.as_secs())
            }
            Self::Decode(message) => write!(f, "decode error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FetchError {
    /// Create transport error from reqwest error
    pub fn from_reqwest(url: &str, e: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    #[cfg(test)]
    fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn http_err(status: u16) -> FetchError {
        FetchError::Transport {
            url: "http://h/elmah.axd".to_string(),
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn display_transport_with_status() {
        assert_eq!(
            format!("{}", http_err(404)),
            "HTTP 404 from http://h/elmah.axd: test"
        );
    }

    #[test]
    fn display_transport_without_status() {
        let err = FetchError::Transport {
            url: "http://h/".to_string(),
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "HTTP error from http://h/: connection refused"
        );
    }

    #[test]
    fn display_io_error() {
        let err = FetchError::Io {
            path: "/tmp/index.csv".to_string(),
            source: std::io::Error::new(ErrorKind::NotFound, "file not found"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("IO error"));
        assert!(msg.contains("/tmp/index.csv"));
    }

    #[test]
    fn display_timeout() {
        let err = FetchError::Timeout {
            url: "http://h/".to_string(),
            after: Duration::from_secs(60),
        };
        assert_eq!(format!("{err}"), "timed out after 60s fetching http://h/");
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error;
        let err = FetchError::Io {
            path: "x".to_string(),
            source: std::io::Error::other("boom"),
        };
        assert!(err.source().is_some());
        assert!(http_err(500).source().is_none());
    }

    #[test]
    fn status_only_for_transport() {
        assert_eq!(http_err(503).status(), Some(503));
        assert_eq!(FetchError::Decode("bad".to_string()).status(), None);
    }
}
