//! Episode lookup in paginated listings
//!
//! A catalog entry lists its episodes as free-text labels ("Episódio 05",
//! "Ep. 5", "Naruto 05"...), possibly spread over several pages. This module
//! walks those pages and picks the entry for a requested episode number.

use crate::catalog::{CatalogSite, EpisodeEntry, EpisodeListing};
use crate::transport::{PageFetcher, fetch_markup};
use regex::Regex;

/// A located episode page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLink {
    pub url: String,
}

/// Matches listing labels against an episode number.
///
/// Patterns go from most to least specific: the bare number (leading zero
/// optional), `Ep N`, `Episode N`, `Episódio N`, and finally a number at the
/// end of the label. All of them respect word boundaries, so episode 3 never
/// matches `Episode 30`.
#[derive(Debug, Clone)]
pub struct EpisodeMatcher {
    episode: u32,
    patterns: Vec<Regex>,
}

impl EpisodeMatcher {
    pub fn new(episode: u32) -> Self {
        let templates = [
            format!(r"(?i)\b0?{}\b", episode),
            format!(r"(?i)\bep\.?\s*0?{}\b", episode),
            format!(r"(?i)\bepisode\s*0?{}\b", episode),
            format!(r"(?i)\bepis[óo]dio\s*0?{}\b", episode),
            format!(r"(?i)\b0?{}\s*$", episode),
        ];

        let patterns = templates
            .iter()
            .filter_map(|template| Regex::new(template).ok())
            .collect();

        Self { episode, patterns }
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Whether a single label refers to the episode
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    /// Picks the entry for the episode from one listing page.
    ///
    /// Patterns are tried in order over all entries, so a label matching a
    /// more specific pattern wins over an earlier label that only matches a
    /// looser one.
    pub fn find<'e>(&self, entries: &'e [EpisodeEntry]) -> Option<&'e EpisodeEntry> {
        self.patterns.iter().find_map(|pattern| {
            entries
                .iter()
                .find(|entry| pattern.is_match(entry.text.trim()))
        })
    }
}

/// What scanning a single listing page led to
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageOutcome {
    Found(EpisodeLink),
    NextPage,
    Exhausted,
}

/// Walks a candidate's episode listing page by page.
pub struct EpisodePaginator<'a> {
    site: &'a dyn CatalogSite,
    fetcher: &'a dyn PageFetcher,
    max_pages: u32,
}

impl<'a> EpisodePaginator<'a> {
    /// Creates a paginator that gives up after `max_pages` pages
    pub fn new(site: &'a dyn CatalogSite, fetcher: &'a dyn PageFetcher, max_pages: u32) -> Self {
        Self {
            site,
            fetcher,
            max_pages,
        }
    }

    /// Locates the page of `episode` in the listing at `locator`.
    ///
    /// Scanning stops at the first page holding a match. Returns `None` if a
    /// page fails to load, the listing runs out of pages, or the page limit is
    /// reached first.
    pub fn locate_episode(&self, locator: &str, episode: u32) -> Option<EpisodeLink> {
        let matcher = EpisodeMatcher::new(episode);

        for page in 1..=self.max_pages {
            let request = self.site.listing_request(locator, page);
            let Some(markup) = fetch_markup(self.fetcher, &request) else {
                tracing::info!(locator, page, "listing page unavailable");
                return None;
            };

            let listing = self.site.parse_episode_listing(&markup);
            match scan_page(&matcher, &listing) {
                PageOutcome::Found(link) => {
                    tracing::info!(locator, episode, page, url = %link.url, "episode located");
                    return Some(link);
                }
                PageOutcome::NextPage => {
                    tracing::debug!(locator, page, "episode not on page, moving on");
                }
                PageOutcome::Exhausted => {
                    let available: Vec<&str> =
                        listing.entries.iter().map(|e| e.text.as_str()).collect();
                    tracing::info!(locator, episode, ?available, "episode not in listing");
                    return None;
                }
            }
        }

        tracing::warn!(
            locator,
            episode,
            max_pages = self.max_pages,
            "page limit reached without finding the episode"
        );
        None
    }
}

fn scan_page(matcher: &EpisodeMatcher, listing: &EpisodeListing) -> PageOutcome {
    match matcher.find(&listing.entries) {
        Some(entry) => PageOutcome::Found(EpisodeLink {
            url: entry.url.clone(),
        }),
        None if listing.has_next_page => PageOutcome::NextPage,
        None => PageOutcome::Exhausted,
    }
}
