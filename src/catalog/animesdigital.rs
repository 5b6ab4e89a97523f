/// Animes Digital catalog adapter.
use super::{
    CatalogSite, EpisodeEntry, EpisodeListing, LanguageTag, SearchCandidate, element_text,
    selector,
};
use crate::extract::ExtractionProfile;
use crate::ranking::RankingPolicy;
use crate::title::SeasonPattern;
use crate::transport::PageRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://animesdigital.org/";

/// Localized "next page" link text
static NEXT_PAGE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)próxim|next").expect("next page regex should compile"));

/// Adapter for https://animesdigital.org
///
/// Searches go through the `/search/<terms>/` path. Episode listings are
/// paginated and sorted oldest first with `?odr=1`.
#[derive(Debug, Clone)]
pub struct AnimesDigital {
    base_url: String,
}

impl AnimesDigital {
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
        let link = item.select(&selector("a[href]")?).next()?;
        let href = link.value().attr("href")?;

        let title_element = item.select(&selector("span.title_anime")?).next();
        let display_title = match &title_element {
            Some(element) => element_text(element),
            None => link.value().attr("title").unwrap_or_default().trim().to_string(),
        };
        if display_title.is_empty() {
            return None;
        }

        let language = match &title_element {
            Some(element) => LanguageTag::from_marker_text(&element_text(element)),
            None => LanguageTag::Sub,
        };

        Some(SearchCandidate {
            display_title,
            locator: self.absolutize(href),
            language,
        })
    }

    fn parse_episode_item(&self, item: &ElementRef<'_>) -> Option<EpisodeEntry> {
        let link = item.select(&selector(r#"a[href*="/video/"]"#)?).next()?;
        let href = link.value().attr("href")?;

        let text = match link.select(&selector("div.title_anime")?).next() {
            Some(title) => element_text(&title),
            None => element_text(&link),
        };

        Some(EpisodeEntry {
            text,
            url: self.absolutize(href),
        })
    }

    fn has_next_page(document: &Html) -> bool {
        let (Some(rel_next), Some(links)) = (selector(r#"a[rel~="next"]"#), selector("a[href]"))
        else {
            return false;
        };

        if document.select(&rel_next).next().is_some() {
            return true;
        }

        document.select(&links).any(|link| {
            let is_episode = link
                .value()
                .attr("href")
                .is_some_and(|href| href.contains("/video/"));

            !is_episode && NEXT_PAGE_TEXT.is_match(&element_text(&link))
        })
    }
}

impl Default for AnimesDigital {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSite for AnimesDigital {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn provider_id(&self) -> &str {
        "animesdigital"
    }

    fn search_request(&self, query: &str) -> PageRequest {
        let terms = query.split_whitespace().collect::<Vec<_>>().join("+");
        let url = format!("{}search/{}/", self.absolutize("/"), terms);
        self.page_request(&url)
    }

    fn parse_results(&self, markup: &str) -> Vec<SearchCandidate> {
        let document = Html::parse_document(markup);
        let Some(items) = selector("div.itemA") else {
            return Vec::new();
        };

        document
            .select(&items)
            .filter_map(|item| self.parse_result_item(&item))
            .collect()
    }

    fn listing_request(&self, locator: &str, page: u32) -> PageRequest {
        let url = if page <= 1 {
            format!("{}?odr=1", locator)
        } else {
            format!("{}/page/{}/?odr=1", locator.trim_end_matches('/'), page)
        };
        self.page_request(&url)
    }

    fn parse_episode_listing(&self, markup: &str) -> EpisodeListing {
        let document = Html::parse_document(markup);
        let Some(items) = selector("div.item_ep") else {
            return EpisodeListing::default();
        };

        let entries = document
            .select(&items)
            .filter_map(|item| self.parse_episode_item(&item))
            .collect();

        EpisodeListing {
            entries,
            has_next_page: Self::has_next_page(&document),
        }
    }

    fn extraction_profile(&self) -> ExtractionProfile {
        ExtractionProfile {
            direct_selector: "video source[src]",
            iframe_selector: "iframe[src]",
            redirect_selector: None,
        }
    }

    fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy::Lenient
    }

    fn season_pattern(&self) -> SeasonPattern {
        SeasonPattern::Markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_request_uses_path() {
        let request = AnimesDigital::new().search_request("kimetsu no  yaiba 2");
        assert_eq!(
            request.display_url(),
            "https://animesdigital.org/search/kimetsu+no+yaiba+2/"
        );
    }

    #[test]
    fn test_parse_results() {
        let markup = r#"
            <div class="itemA">
              <a href="/anime/a/kimetsu-no-yaiba" title="ignored">
                <span class="title_anime"> Kimetsu no Yaiba </span>
              </a>
            </div>
            <div class="itemA">
              <a href="https://animesdigital.org/anime/a/kny-dub" title="Kimetsu no Yaiba Dublado"></a>
              <span class="title_anime">Kimetsu no Yaiba Dublado</span>
            </div>
            <div class="itemA">
              <a href="/anime/a/fallback" title="Fallback Title"></a>
            </div>
            <div class="itemA"><span class="title_anime">No link</span></div>
            <div class="itemA"><a href="/anime/a/empty"></a></div>
        "#;

        let candidates = AnimesDigital::new().parse_results(markup);
        assert_eq!(
            candidates,
            vec![
                SearchCandidate {
                    display_title: "Kimetsu no Yaiba".to_string(),
                    locator: "https://animesdigital.org/anime/a/kimetsu-no-yaiba".to_string(),
                    language: LanguageTag::Sub,
                },
                SearchCandidate {
                    display_title: "Kimetsu no Yaiba Dublado".to_string(),
                    locator: "https://animesdigital.org/anime/a/kny-dub".to_string(),
                    language: LanguageTag::Dub,
                },
                SearchCandidate {
                    display_title: "Fallback Title".to_string(),
                    locator: "https://animesdigital.org/anime/a/fallback".to_string(),
                    language: LanguageTag::Sub,
                },
            ]
        );
    }

    #[test]
    fn test_listing_requests() {
        let site = AnimesDigital::new();
        let locator = "https://animesdigital.org/anime/a/naruto";
        assert_eq!(
            site.listing_request(locator, 1).display_url(),
            "https://animesdigital.org/anime/a/naruto?odr=1"
        );
        assert_eq!(
            site.listing_request(locator, 3).display_url(),
            "https://animesdigital.org/anime/a/naruto/page/3/?odr=1"
        );
    }

    #[test]
    fn test_parse_episode_listing() {
        let markup = r#"
            <div class="item_ep">
              <a href="/video/a/1001"><div class="title_anime">Naruto Episódio 01</div><span>HD</span></a>
            </div>
            <div class="item_ep">
              <a href="/video/a/1002">Naruto Episódio 02</a>
            </div>
            <div class="item_ep"><a href="/anime/a/naruto">Not an episode</a></div>
            <a class="next page-numbers" href="/anime/a/naruto/page/2/">Próxima</a>
        "#;

        let listing = AnimesDigital::new().parse_episode_listing(markup);
        assert!(listing.has_next_page);
        assert_eq!(
            listing.entries,
            vec![
                EpisodeEntry {
                    text: "Naruto Episódio 01".to_string(),
                    url: "https://animesdigital.org/video/a/1001".to_string(),
                },
                EpisodeEntry {
                    text: "Naruto Episódio 02".to_string(),
                    url: "https://animesdigital.org/video/a/1002".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rel_next_link() {
        let markup = r#"<div class="item_ep"></div><a rel="next" href="?page=2">»</a>"#;
        assert!(AnimesDigital::new().parse_episode_listing(markup).has_next_page);

        let markup = r#"<div class="item_ep"></div><a rel="next nofollow" href="/p/2/">2</a>"#;
        assert!(AnimesDigital::new().parse_episode_listing(markup).has_next_page);

        let markup = r#"<div class="item_ep"></div><a rel="nextpage" href="/p/2/">2</a>"#;
        assert!(!AnimesDigital::new().parse_episode_listing(markup).has_next_page);

        let markup = r#"<div class="item_ep"></div><a href="/">Início</a>"#;
        assert!(!AnimesDigital::new().parse_episode_listing(markup).has_next_page);
    }
}
