//! SourceSleuth - Resolve playable episode links from anime catalog sites
//!
//! This library turns a show's canonical title and an episode number into
//! direct media links: it searches a catalog site, ranks the results by title
//! similarity, walks each result's episode listing and pulls the media URL
//! out of the episode page.

pub mod catalog;
pub mod config;
pub mod episode;
pub mod extract;
pub mod metadata;
pub mod pipeline;
pub mod ranking;
pub mod source;
pub mod title;
pub mod transport;

mod cache;
#[cfg(test)]
mod testing;

use catalog::Site;
use config::ResolverConfig;
use metadata::TitleStore;
use pipeline::Resolver;
use transport::{CachedFetcher, HttpFetcher, PageFetcher};

// Re-export error types
pub use cache::CacheError;
pub use config::ConfigError;
pub use metadata::MetadataError;
pub use transport::TransportError;

pub use metadata::CanonicalTitle;
pub use source::SourceRecord;

use thiserror::Error;

/// Progress event emitted while resolving an episode
///
/// These events allow library users to track progress and provide feedback
/// during a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Resolution started
    Started { title: String, episode: u32 },

    /// Searching the catalog with a query
    Searching { query: String },

    /// A search page was parsed
    CandidatesFound { query: String, count: usize },

    /// Search results were scored and filtered
    CandidatesRanked { count: usize },

    /// Looking for the episode in a specific search result
    ProcessingCandidate {
        index: usize,
        total: usize,
        title: String,
        score: f64,
    },

    /// A playable source was found
    SourceFound { reference: String },

    /// Resolution complete
    Complete { source_count: usize },
}

/// Top-level error type for SourceSleuth operations
///
/// Only setup can fail. Once a resolution runs, network and parsing problems
/// just mean fewer sources.
#[derive(Debug, Error)]
pub enum SleuthError {
    /// Error while building the HTTP client
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error while looking up the show
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Finds the playable sources for an episode of a show
///
/// Looks up the show's canonical title in `store`, then resolves the episode
/// against `site` over HTTP. Fetched pages go through the on-disk cache unless
/// `config.use_cache` is off.
///
/// Progress events are emitted through the provided callback, allowing library
/// users to track progress, display status, or remain silent.
///
/// # Returns
///
/// The sources found, best match first. An empty vector means no candidate
/// led to a playable link.
///
/// # Examples
///
/// ```no_run
/// use source_sleuth::catalog::Site;
/// use source_sleuth::config::ResolverConfig;
/// use source_sleuth::metadata::MemoryTitleStore;
/// use source_sleuth::{CanonicalTitle, ProgressEvent, find_sources};
///
/// let mut store = MemoryTitleStore::new();
/// store.insert(
///     "kny",
///     CanonicalTitle::new(
///         Some("Demon Slayer".to_string()),
///         Some("Kimetsu no Yaiba".to_string()),
///         1,
///     ),
/// );
///
/// let sources = find_sources(
///     &store,
///     "kny",
///     5,
///     Site::AnimesDigital,
///     &ResolverConfig::default(),
///     |event| {
///         if let ProgressEvent::Searching { query } = event {
///             println!("Searching for '{}'", query);
///         }
///     },
/// )
/// .unwrap();
///
/// for source in sources {
///     println!("{}", source.media_reference);
/// }
/// ```
pub fn find_sources<F>(
    store: &dyn TitleStore,
    show_id: &str,
    episode: u32,
    site: Site,
    config: &ResolverConfig,
    progress_callback: F,
) -> Result<Vec<SourceRecord>, SleuthError>
where
    F: FnMut(ProgressEvent),
{
    config.validate()?;
    let canonical = store.canonical_title(show_id)?;

    let http = HttpFetcher::new(config)?;
    let fetcher: Box<dyn PageFetcher> = if config.use_cache {
        Box::new(CachedFetcher::open(http, config.cache_ttl())?)
    } else {
        Box::new(http)
    };

    let adapter = site.adapter();
    Ok(resolve_episode(
        &Resolver::new(adapter.as_ref(), fetcher.as_ref(), config),
        &canonical,
        episode,
        progress_callback,
    ))
}

/// Runs a resolver, framing its progress with start and completion events
fn resolve_episode<F>(
    resolver: &Resolver<'_>,
    canonical: &CanonicalTitle,
    episode: u32,
    mut progress_callback: F,
) -> Vec<SourceRecord>
where
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        title: canonical.display_name().unwrap_or_default().to_string(),
        episode,
    });

    let sources = resolver.resolve_with_progress(canonical, episode, &mut progress_callback);

    progress_callback(ProgressEvent::Complete {
        source_count: sources.len(),
    });

    sources
}
