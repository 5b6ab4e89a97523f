//! Cached page fetcher implementation
//!
//! This module provides a caching wrapper for page fetchers that stores
//! fetched markup on disk, keyed by the request signature.

use super::{PageFetcher, PageRequest, TransportError};
use crate::cache::{CacheError, CacheStorage};
use std::time::Duration;

/// A caching wrapper for page fetchers
///
/// Catalog pages change slowly, so repeated lookups for the same show reuse
/// the markup fetched earlier until the cache entry expires. Cache failures
/// never fail a fetch.
pub struct CachedFetcher<F>
where
    F: PageFetcher,
{
    /// The underlying fetcher
    fetcher: F,
    /// Cache storage for page markup
    cache: CacheStorage<String>,
}

impl<F> CachedFetcher<F>
where
    F: PageFetcher,
{
    /// Wraps `fetcher` with the page cache in the system cache directory
    ///
    /// Entries older than `ttl` are fetched again.
    pub fn open(fetcher: F, ttl: Duration) -> Result<Self, CacheError> {
        let cache = CacheStorage::open("pages", Some(ttl))?;
        tracing::debug!(dir = %cache.cache_dir().display(), "page cache opened");
        Ok(Self::new(fetcher, cache))
    }

    pub(crate) fn new(fetcher: F, cache: CacheStorage<String>) -> Self {
        Self { fetcher, cache }
    }

    /// Generates a cache key for a request
    ///
    /// The signature includes the query string and any form body, so a
    /// search by query parameter and by POST are cached separately.
    fn cache_key(request: &PageRequest) -> String {
        blake3::hash(request.signature().as_bytes())
            .to_hex()
            .to_string()
    }
}

impl<F> PageFetcher for CachedFetcher<F>
where
    F: PageFetcher,
{
    fn fetch(&self, request: &PageRequest) -> Result<String, TransportError> {
        let cache_key = Self::cache_key(request);

        match self.cache.load(&cache_key) {
            Ok(Some(markup)) => {
                tracing::trace!(url = %request.display_url(), "page cache hit");
                return Ok(markup);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(error = %e, "page cache read failed");
            }
        }

        let markup = self.fetcher.fetch(request)?;

        if let Err(e) = self.cache.store(&cache_key, &markup) {
            tracing::debug!(error = %e, "page cache write failed");
        }

        Ok(markup)
    }
}
