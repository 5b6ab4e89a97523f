/// HTTP page fetcher implementation.
use super::{PageFetcher, PageRequest, TransportError};
use crate::config::ResolverConfig;
use std::time::Duration;

/// Page fetcher backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Creates a fetcher using the timeout and user agent from `config`.
    pub fn new(config: &ResolverConfig) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::ClientError(e.to_string()))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        let mut builder = match &request.form {
            Some(form) => self.client.post(&request.url).form(form),
            None => self.client.get(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| TransportError::RequestFailed {
                url: request.display_url(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::HttpStatus {
                url: request.display_url(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().map_err(|e| TransportError::RequestFailed {
            url: request.display_url(),
            reason: e.to_string(),
        })?;

        if body.trim().is_empty() {
            return Err(TransportError::EmptyBody {
                url: request.display_url(),
            });
        }

        Ok(body)
    }
}
