//! Test helpers shared across modules

use crate::transport::{PageFetcher, PageRequest, TransportError};
use std::cell::RefCell;
use std::collections::HashMap;

/// A fetcher serving canned markup keyed by the request's display URL.
///
/// Unknown URLs fail with a 404. Every request is recorded.
#[derive(Debug, Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    /// Display URLs of all requests so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl PageFetcher for StaticFetcher {
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        let url = request.display_url();
        self.requested.borrow_mut().push(url.clone());

        self.pages
            .get(&url)
            .cloned()
            .ok_or(TransportError::HttpStatus { url, status: 404 })
    }
}
