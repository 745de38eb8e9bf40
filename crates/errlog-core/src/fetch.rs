//! Text fetching over HTTP or from local files.
//!
//! Uses async reqwest internally with tokio::time::timeout per request,
//! but presents a blocking interface so the export pipeline stays a plain
//! sequential loop.

use std::sync::LazyLock;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;

/// Default per-fetch timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch capability: load the text behind a URL.
///
/// Implementations decide how to reach the document (`file:` read,
/// network GET, in-memory map in tests).
pub trait TextFetcher {
    fn get(&self, url: &Url) -> Result<String, FetchError>;
}

impl<T: TextFetcher + ?Sized> TextFetcher for &T {
    fn get(&self, url: &Url) -> Result<String, FetchError> {
        (**self).get(url)
    }
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Upper bound for one whole fetch (connect + headers + body)
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: concat!("errlog/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Fetcher that reads `file:` URLs from disk and GETs everything else.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn get_remote(&self, url: &Url) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        SHARED_RUNTIME.handle().block_on(async {
            let request = async {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;

                // Decodes using the charset from Content-Type, UTF-8 otherwise
                response
                    .text()
                    .await
                    .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))
            };

            match tokio::time::timeout(self.timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }),
            }
        })
    }
}

impl TextFetcher for HttpFetcher {
    fn get(&self, url: &Url) -> Result<String, FetchError> {
        if url.scheme() == "file" {
            read_local(url)
        } else {
            self.get_remote(url)
        }
    }
}

/// Read a `file:` URL, honoring a byte-order mark if present.
pub fn read_local(url: &Url) -> Result<String, FetchError> {
    let path = url.to_file_path().map_err(|()| FetchError::Io {
        path: url.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "URL does not denote a local file path",
        ),
    })?;
    log::debug!("Reading {}", path.display());
    let bytes = std::fs::read(&path).map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(decode_text(&bytes))
}

/// Decode bytes as text: BOM wins, UTF-8 otherwise (lossy).
fn decode_text(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
    text.into_owned()
}
