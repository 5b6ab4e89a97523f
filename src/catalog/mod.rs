//! Catalog site adapters
//!
//! Every catalog site shares the same resolution pipeline and differs only
//! in how it is searched and how its pages are laid out. This module holds
//! the adapter trait capturing those differences, the data types adapters
//! produce, and the adapters for the supported sites.
mod animefhd;
mod animesdigital;

pub use animefhd::AnimeFhd;
pub use animesdigital::AnimesDigital;

use crate::extract::ExtractionProfile;
use crate::ranking::RankingPolicy;
use crate::title::SeasonPattern;
use crate::transport::PageRequest;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::fmt;

/// Audio language of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LanguageTag {
    /// Original audio with subtitles
    #[serde(rename = "SUB")]
    Sub,
    /// Dubbed audio
    #[serde(rename = "DUB")]
    Dub,
}

impl LanguageTag {
    /// Tags a title as dubbed when `text` contains a "dublado" marker.
    pub fn from_marker_text(text: &str) -> Self {
        if text.to_lowercase().contains("dublado") {
            LanguageTag::Dub
        } else {
            LanguageTag::Sub
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageTag::Sub => write!(f, "SUB"),
            LanguageTag::Dub => write!(f, "DUB"),
        }
    }
}

/// A catalog search result that may refer to the requested show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    /// Title as shown by the catalog
    pub display_title: String,
    /// Absolute URL of the entry's page
    pub locator: String,
    pub language: LanguageTag,
}

/// One entry of an episode listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    /// Text the entry is labelled with, e.g. `Episódio 05`
    pub text: String,
    /// Absolute URL of the episode page
    pub url: String,
}

/// A single page of a candidate's episode listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeListing {
    pub entries: Vec<EpisodeEntry>,
    /// Whether the page links to a following page
    pub has_next_page: bool,
}

/// Trait for catalog site adapters.
///
/// Implementors describe how to search one site and how to read its result,
/// listing and episode pages. Parsing methods never fail; entries that
/// cannot be read are skipped.
pub trait CatalogSite {
    /// Base URL of the site, also sent as the referer
    fn base_url(&self) -> &str;

    /// Identifier recorded as the provider of produced sources
    fn provider_id(&self) -> &str;

    /// Builds the search request for a query
    fn search_request(&self, query: &str) -> PageRequest;

    /// Extracts the candidates from a search result page
    fn parse_results(&self, markup: &str) -> Vec<SearchCandidate>;

    /// Builds the request for a page (starting at 1) of a candidate's episode listing
    fn listing_request(&self, locator: &str, page: u32) -> PageRequest;

    /// Extracts the episode entries from a listing page
    fn parse_episode_listing(&self, markup: &str) -> EpisodeListing;

    /// Where on an episode page the media URL can be found
    fn extraction_profile(&self) -> ExtractionProfile;

    fn ranking_policy(&self) -> RankingPolicy;

    fn season_pattern(&self) -> SeasonPattern;

    /// A GET request for `url` carrying the site's referer
    fn page_request(&self, url: &str) -> PageRequest {
        PageRequest::get(url).with_header("Referer", self.base_url())
    }

    /// Resolves a possibly relative link against the site's base URL
    fn absolutize(&self, href: &str) -> String {
        absolutize(self.base_url(), href)
    }
}

/// The supported catalog sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    AnimeFhd,
    AnimesDigital,
}

impl Site {
    /// Returns the adapter for this site
    pub fn adapter(&self) -> Box<dyn CatalogSite> {
        match self {
            Site::AnimeFhd => Box::new(AnimeFhd::new()),
            Site::AnimesDigital => Box::new(AnimesDigital::new()),
        }
    }
}

/// Resolves `href` against `base`.
///
/// Absolute links are returned unchanged. If `base` is not a valid URL the
/// link is appended to it.
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    match url::Url::parse(base).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            href.trim_start_matches('/')
        ),
    }
}

/// Parses a CSS selector, logging selectors that do not compile
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!(selector = css, error = ?e, "invalid CSS selector");
            None
        }
    }
}

/// The whitespace-trimmed text content of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
