/// AnimeFHD catalog adapter.
use super::{
    CatalogSite, EpisodeEntry, EpisodeListing, LanguageTag, SearchCandidate, element_text,
    selector,
};
use crate::extract::ExtractionProfile;
use crate::ranking::RankingPolicy;
use crate::title::SeasonPattern;
use crate::transport::PageRequest;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://animefhd.com/";

/// Adapter for https://animefhd.com
///
/// The site is searched through the `s` query parameter. Each show lists all
/// of its episodes on a single page. Later seasons are usually named with a
/// bare trailing number, and search results mix seasons freely, so ranking
/// discards results whose season differs from the requested one.
#[derive(Debug, Clone)]
pub struct AnimeFhd {
    base_url: String,
}

impl AnimeFhd {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Creates the adapter against a different host, e.g. a mirror
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn parse_result_item(&self, item: &ElementRef<'_>) -> Option<SearchCandidate> {
        let link = item.select(&selector("a")?).next()?;
        let href = link.value().attr("href")?;
        let title = link.value().attr("title")?.trim();
        if title.is_empty() {
            return None;
        }

        // Items without a name block are layout leftovers, not results
        let name_block = item.select(&selector("div.aniNome")?).next()?;

        Some(SearchCandidate {
            display_title: title.to_string(),
            locator: self.absolutize(href),
            language: LanguageTag::from_marker_text(&element_text(&name_block)),
        })
    }
}

impl Default for AnimeFhd {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSite for AnimeFhd {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn provider_id(&self) -> &str {
        "animesfhd"
    }

    fn search_request(&self, query: &str) -> PageRequest {
        self.page_request(&self.base_url).with_query("s", query)
    }

    fn parse_results(&self, markup: &str) -> Vec<SearchCandidate> {
        let document = Html::parse_document(markup);
        let (Some(section), Some(item)) = (
            selector(r#"div[class^="SectionBusca"]"#),
            selector("div.ultAnisContainerItem"),
        ) else {
            return Vec::new();
        };

        document
            .select(&section)
            .flat_map(|section| section.select(&item))
            .filter_map(|item| self.parse_result_item(&item))
            .collect()
    }

    /// Listings are never paginated, so every page maps to the show page
    fn listing_request(&self, locator: &str, _page: u32) -> PageRequest {
        self.page_request(locator)
    }

    fn parse_episode_listing(&self, markup: &str) -> EpisodeListing {
        let document = Html::parse_document(markup);
        let Some(links) = selector("div.sectionEpiInAnime a[href]") else {
            return EpisodeListing::default();
        };

        let entries = document
            .select(&links)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                Some(EpisodeEntry {
                    text: element_text(&link),
                    url: self.absolutize(href),
                })
            })
            .collect();

        EpisodeListing {
            entries,
            has_next_page: false,
        }
    }

    fn extraction_profile(&self) -> ExtractionProfile {
        ExtractionProfile {
            direct_selector: "source[src]",
            iframe_selector: "iframe[src]",
            redirect_selector: Some("#Link [href]"),
        }
    }

    fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy::Strict
    }

    fn season_pattern(&self) -> SeasonPattern {
        SeasonPattern::MarkersOrTrailingNumber
    }
}
