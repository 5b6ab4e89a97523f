//! Page transport
//!
//! This module provides the request description and the fetcher trait the
//! resolution pipeline uses to retrieve raw markup, together with an HTTP
//! implementation and a caching wrapper.
mod cached;
mod http;

pub use cached::CachedFetcher;
pub use http::HttpFetcher;

use thiserror::Error;

/// Errors that can occur while fetching a page.
///
/// Inside the resolution pipeline these never propagate; a failed fetch is
/// treated as a page that produced nothing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),

    /// The request could not be sent or the body could not be read
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// The server answered with an empty body
    #[error("Empty response from {url}")]
    EmptyBody { url: String },
}

/// A single page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Absolute URL of the page
    pub url: String,
    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,
    /// Form fields; when present the request is sent as a POST
    pub form: Option<Vec<(String, String)>>,
    /// Additional request headers
    pub headers: Vec<(String, String)>,
}

impl PageRequest {
    /// Creates a GET request for the given URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Adds a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Turns the request into a POST with the given form fields
    pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
        self.form = Some(form);
        self
    }

    /// The HTTP method this request will be sent with
    pub fn method(&self) -> &'static str {
        if self.form.is_some() { "POST" } else { "GET" }
    }

    /// The URL including its query string, for logging and lookups
    ///
    /// Query values are not percent-encoded.
    pub fn display_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }

        let query = join_pairs(&self.query);
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// A string that uniquely identifies what this request fetches
    ///
    /// Headers are not part of the signature.
    pub fn signature(&self) -> String {
        let mut signature = format!("{} {}", self.method(), self.display_url());
        if let Some(form) = &self.form {
            signature.push('\n');
            signature.push_str(&join_pairs(form));
        }
        signature
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Trait for anything that can turn a page request into raw markup.
pub trait PageFetcher {
    /// Fetches the page described by `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the page could not be retrieved.
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError>;
}

impl<F> PageFetcher for &F
where
    F: PageFetcher + ?Sized,
{
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        (**self).fetch(request)
    }
}

impl<F> PageFetcher for Box<F>
where
    F: PageFetcher + ?Sized,
{
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        (**self).fetch(request)
    }
}

/// Fetches a page and logs failures, turning them into `None`.
pub(crate) fn fetch_markup(fetcher: &dyn PageFetcher, request: &PageRequest) -> Option<String> {
    match fetcher.fetch(request) {
        Ok(markup) => Some(markup),
        Err(e) => {
            tracing::warn!(url = %request.display_url(), error = %e, "fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url() {
        assert_eq!(
            PageRequest::get("https://animefhd.com/").display_url(),
            "https://animefhd.com/"
        );
        assert_eq!(
            PageRequest::get("https://animefhd.com/")
                .with_query("s", "kimetsu no yaiba")
                .display_url(),
            "https://animefhd.com/?s=kimetsu no yaiba"
        );
        assert_eq!(
            PageRequest::get("https://x.test/a?odr=1")
                .with_query("p", "2")
                .display_url(),
            "https://x.test/a?odr=1&p=2"
        );
    }

    #[test]
    fn test_signature_ignores_headers() {
        let plain = PageRequest::get("https://x.test/");
        let with_header = plain.clone().with_header("Referer", "https://x.test/");
        assert_eq!(plain.signature(), with_header.signature());

        let post = plain
            .clone()
            .with_form(vec![("q".to_string(), "naruto".to_string())]);
        assert_eq!(post.method(), "POST");
        assert_eq!(post.signature(), "POST https://x.test/\nq=naruto");
    }
}
