//! Test doubles shared by unit tests

use std::cell::RefCell;
use std::collections::HashMap;

use errlog_core::{FetchError, TextFetcher};
use url::Url;

/// In-memory fetcher recording every request
#[derive(Default)]
pub struct MapFetcher {
    pub pages: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MapFetcher {
    pub fn with(url: &str, body: &str) -> Self {
        Self::default().page(url, body)
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl TextFetcher for MapFetcher {
    fn get(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                status: Some(404),
                message: "Not Found".to_string(),
            })
    }
}
