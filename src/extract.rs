//! Media URL extraction
//!
//! Episode pages embed their video in different ways: a plain `<source>`
//! tag, an iframe to a player page whose script carries the file URL, or a
//! link to a separate download page. The extractor tries each of these in a
//! fixed order and stops at the first that yields a URL.

use crate::catalog::{CatalogSite, selector};
use crate::transport::{PageFetcher, fetch_markup};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// `sources: [{ file: '<url>' ... }]` in a player script
static SCRIPT_SOURCES_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)sources:\s*\[.+?file:\s*['"]([^'"]+)['"]"#)
        .expect("script sources regex should compile")
});

/// Any `file: '<url>'` literal
static SCRIPT_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)file:\s*['"]([^'"]+)['"]"#).expect("script file regex should compile")
});

/// Where a site's episode pages keep their media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionProfile {
    /// Selector for an element whose `src` is the media URL
    pub direct_selector: &'static str,
    /// Selector for the player iframe
    pub iframe_selector: &'static str,
    /// Selector for an element whose `href` leads to a page holding the file URL
    pub redirect_selector: Option<&'static str>,
}

/// The extraction strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Direct,
    Iframe,
    Redirect,
}

impl ExtractionStage {
    const ORDER: [ExtractionStage; 3] = [
        ExtractionStage::Direct,
        ExtractionStage::Iframe,
        ExtractionStage::Redirect,
    ];
}

/// Resolves the media URL of an episode page.
pub struct LinkExtractor<'a> {
    site: &'a dyn CatalogSite,
    fetcher: &'a dyn PageFetcher,
    profile: ExtractionProfile,
}

impl<'a> LinkExtractor<'a> {
    pub fn new(site: &'a dyn CatalogSite, fetcher: &'a dyn PageFetcher) -> Self {
        Self {
            site,
            fetcher,
            profile: site.extraction_profile(),
        }
    }

    /// Extracts the media URL from an episode page.
    ///
    /// Returns `None` when no stage finds a URL, which is a normal outcome
    /// for pages without a playable video.
    pub fn extract(&self, page_markup: &str) -> Option<String> {
        // Targets are read up front so no parsed document is held across fetches
        let targets = self.read_targets(page_markup);

        for stage in ExtractionStage::ORDER {
            let url = match stage {
                ExtractionStage::Direct => targets.direct.clone(),
                ExtractionStage::Iframe => targets
                    .iframe
                    .as_deref()
                    .and_then(|url| self.from_iframe(url)),
                ExtractionStage::Redirect => targets
                    .redirect
                    .as_deref()
                    .and_then(|url| self.from_redirect(url)),
            };

            match url {
                Some(url) => {
                    tracing::debug!(?stage, url = %url, "extraction stage succeeded");
                    return Some(url);
                }
                None => tracing::debug!(?stage, "extraction stage found nothing"),
            }
        }

        None
    }

    fn read_targets(&self, page_markup: &str) -> PageTargets {
        let document = Html::parse_document(page_markup);

        let direct = first_attr(&document, self.profile.direct_selector, "src")
            .map(|src| self.site.absolutize(&src));
        let iframe = first_attr(&document, self.profile.iframe_selector, "src")
            .map(|src| self.site.absolutize(&src));
        let redirect = self
            .profile
            .redirect_selector
            .and_then(|css| first_attr(&document, css, "href"))
            .map(|href| self.site.absolutize(&href));

        PageTargets {
            direct,
            iframe,
            redirect,
        }
    }

    /// Player pages keep the file URL in a script, or fall back to a `<source>` tag
    fn from_iframe(&self, url: &str) -> Option<String> {
        let markup = fetch_markup(self.fetcher, &self.site.page_request(url))?;

        if let Some(url) = capture(&SCRIPT_SOURCES_FILE, &markup) {
            return Some(url);
        }

        let document = Html::parse_document(&markup);
        first_attr(&document, "source[src]", "src")
    }

    fn from_redirect(&self, url: &str) -> Option<String> {
        let markup = fetch_markup(self.fetcher, &self.site.page_request(url))?;
        capture(&SCRIPT_FILE, &markup)
    }
}

struct PageTargets {
    direct: Option<String>,
    iframe: Option<String>,
    redirect: Option<String>,
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}
