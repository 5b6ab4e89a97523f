//! The resolution pipeline
//!
//! canonical title → queries → search → ranking → (per candidate) episode
//! lookup → link extraction → source records.
//!
//! Every stage that talks to the network treats a failure as "found
//! nothing" and the pipeline carries on with whatever is left, so a
//! resolution never fails; it only ever comes back with fewer sources.

use crate::ProgressEvent;
use crate::catalog::{CatalogSite, SearchCandidate};
use crate::config::ResolverConfig;
use crate::episode::EpisodePaginator;
use crate::extract::LinkExtractor;
use crate::metadata::CanonicalTitle;
use crate::ranking::{RankedCandidate, Ranker};
use crate::source::{SourceRecord, SourceRecordBuilder};
use crate::title::{QueryPlan, build_queries, infer_season, normalize};
use crate::transport::{PageFetcher, fetch_markup};

/// Resolves episodes against one catalog site.
pub struct Resolver<'a> {
    site: &'a dyn CatalogSite,
    fetcher: &'a dyn PageFetcher,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        site: &'a dyn CatalogSite,
        fetcher: &'a dyn PageFetcher,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            site,
            fetcher,
            config,
        }
    }

    /// Finds the playable sources for an episode of a show.
    pub fn resolve(&self, canonical: &CanonicalTitle, episode: u32) -> Vec<SourceRecord> {
        self.resolve_with_progress(canonical, episode, &mut |_| {})
    }

    /// Like [`Resolver::resolve`], reporting progress through `progress`.
    pub fn resolve_with_progress(
        &self,
        canonical: &CanonicalTitle,
        episode: u32,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Vec<SourceRecord> {
        let season = infer_season(
            [canonical.name.as_deref(), canonical.alt_name.as_deref()],
            self.site.season_pattern(),
            canonical.season,
        );
        tracing::debug!(
            name = ?canonical.name,
            alt_name = ?canonical.alt_name,
            season,
            "resolving episode {}",
            episode
        );

        let plan = build_queries(canonical, season);
        let candidates = self.search(&plan, progress);
        if candidates.is_empty() {
            tracing::info!(queries = ?plan.queries, "no search results");
            return Vec::new();
        }

        let ranker = Ranker::new(
            self.site.ranking_policy(),
            self.site.season_pattern(),
            self.config.similarity_threshold,
        );
        let ranked = ranker.rank(candidates, &plan.probes, season);
        tracing::info!(survivors = ranked.len(), "candidates ranked");
        progress(ProgressEvent::CandidatesRanked {
            count: ranked.len(),
        });

        let title = normalize(canonical.display_name().unwrap_or_default());
        let builder = SourceRecordBuilder::new(self.site.provider_id(), self.site.base_url());

        let mut sources = Vec::new();
        for (index, candidate) in ranked.iter().enumerate() {
            progress(ProgressEvent::ProcessingCandidate {
                index,
                total: ranked.len(),
                title: candidate.candidate.display_title.clone(),
                score: candidate.score,
            });

            // A failing candidate only costs its own source
            if let Some(source) = self.resolve_candidate(candidate, &title, episode, &builder) {
                progress(ProgressEvent::SourceFound {
                    reference: source.media_reference.to_string(),
                });
                sources.push(source);
            }
        }

        tracing::info!(count = sources.len(), episode, "resolution finished");
        sources
    }

    /// Tries the planned queries in order and returns the first non-empty result set
    fn search(
        &self,
        plan: &QueryPlan,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Vec<SearchCandidate> {
        for query in &plan.queries {
            tracing::debug!(query = %query, "searching catalog");
            progress(ProgressEvent::Searching {
                query: query.clone(),
            });

            let Some(markup) = self.search_markup(query) else {
                continue;
            };

            let candidates = self.site.parse_results(&markup);
            tracing::info!(query = %query, count = candidates.len(), "search results parsed");
            progress(ProgressEvent::CandidatesFound {
                query: query.clone(),
                count: candidates.len(),
            });

            if !candidates.is_empty() {
                return candidates;
            }
        }

        Vec::new()
    }

    /// Fetches a search page, retrying once without the subtitle
    fn search_markup(&self, query: &str) -> Option<String> {
        if let Some(markup) = fetch_markup(self.fetcher, &self.site.search_request(query)) {
            return Some(markup);
        }

        let (main_title, _) = query.split_once(':')?;
        let main_title = main_title.trim();
        if main_title.is_empty() {
            return None;
        }

        tracing::debug!(query = %main_title, "retrying search without subtitle");
        fetch_markup(self.fetcher, &self.site.search_request(main_title))
    }

    fn resolve_candidate(
        &self,
        ranked: &RankedCandidate,
        title: &str,
        episode: u32,
        builder: &SourceRecordBuilder,
    ) -> Option<SourceRecord> {
        let candidate = &ranked.candidate;
        tracing::debug!(
            locator = %candidate.locator,
            language = %candidate.language,
            score = ranked.score,
            "processing candidate"
        );

        let paginator = EpisodePaginator::new(self.site, self.fetcher, self.config.max_pages);
        let link = paginator.locate_episode(&candidate.locator, episode)?;

        let page = fetch_markup(self.fetcher, &self.site.page_request(&link.url))?;
        let Some(url) = LinkExtractor::new(self.site, self.fetcher).extract(&page) else {
            tracing::info!(episode_page = %link.url, "no media url on episode page");
            return None;
        };

        let source = builder.build(title, episode, &url, candidate.language);
        tracing::info!(
            provider = %source.provider_id,
            reference = %source.media_reference,
            "source found"
        );
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnimeFhd, AnimesDigital, LanguageTag};
    use crate::testing::StaticFetcher;
    use pretty_assertions::assert_eq;

    fn demon_slayer() -> CanonicalTitle {
        CanonicalTitle::new(
            Some("Demon Slayer".to_string()),
            Some("Kimetsu no Yaiba".to_string()),
            1,
        )
    }

    const DIGITAL_SEARCH: &str = r#"
        <div class="itemA"><a href="/anime/a/kimetsu-no-yaiba"><span class="title_anime">Kimetsu no Yaiba</span></a></div>
        <div class="itemA"><a href="/anime/a/kimetsu-no-yaiba-dublado"><span class="title_anime">Kimetsu no Yaiba Dublado</span></a></div>
        <div class="itemA"><a href="/anime/a/boruto"><span class="title_anime">Boruto</span></a></div>
    "#;

    fn digital_listing() -> String {
        (1..=6)
            .map(|ep| {
                format!(
                    r#"<div class="item_ep"><a href="/video/a/{ep}"><div class="title_anime">Kimetsu no Yaiba Episódio {ep:02}</div></a></div>"#
                )
            })
            .collect()
    }

    fn digital_fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(
                "https://animesdigital.org/search/kimetsu+no+yaiba/",
                DIGITAL_SEARCH,
            )
            .with_page(
                "https://animesdigital.org/anime/a/kimetsu-no-yaiba?odr=1",
                &digital_listing(),
            )
            .with_page(
                "https://animesdigital.org/video/a/5",
                r#"<div class="player"><iframe src="/player/5"></iframe></div>"#,
            )
            .with_page(
                "https://animesdigital.org/player/5",
                r#"<script>player.setup({sources: [{file: 'https://cdn.example/ep5.mp4'}]});</script>"#,
            )
    }

    #[test]
    fn test_resolves_episode_through_iframe() {
        let site = AnimesDigital::new();
        let fetcher = digital_fetcher();
        let config = ResolverConfig::default();
        let resolver = Resolver::new(&site, &fetcher, &config);

        let sources = resolver.resolve(&demon_slayer(), 5);

        assert_eq!(sources.len(), 1);
        let source = &sources[0];
        assert_eq!(
            source.media_reference.to_string(),
            "https://cdn.example/ep5.mp4|Referer=https://animesdigital.org/"
        );
        assert_eq!(source.release_title, "demon slayer - Ep 5");
        assert_eq!(source.language_flags, vec![LanguageTag::Sub]);
        assert_eq!(source.provider_id, "animesdigital");

        let requested = fetcher.requested();
        assert_eq!(
            requested[0],
            "https://animesdigital.org/search/kimetsu+no+yaiba/"
        );
        // The dubbed candidate was tried after the subbed one and failed quietly
        assert!(requested.contains(
            &"https://animesdigital.org/anime/a/kimetsu-no-yaiba-dublado?odr=1".to_string()
        ));
        assert!(!requested.iter().any(|url| url.contains("boruto")));
        assert!(!requested.iter().any(|url| url.contains("demon+slayer")));
    }

    #[test]
    fn test_falls_back_to_next_query() {
        let site = AnimesDigital::new();
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://animesdigital.org/search/kimetsu+no+yaiba/",
                "<p>Nenhum resultado</p>",
            )
            .with_page(
                "https://animesdigital.org/search/demon+slayer/",
                r#"<div class="itemA"><a href="/anime/a/demon-slayer"><span class="title_anime">Demon Slayer</span></a></div>"#,
            );
        let config = ResolverConfig::default();
        let resolver = Resolver::new(&site, &fetcher, &config);

        let mut events = Vec::new();
        let sources = resolver.resolve_with_progress(&demon_slayer(), 5, &mut |event| {
            events.push(event)
        });

        assert!(sources.is_empty());
        assert_eq!(
            fetcher.requested(),
            vec![
                "https://animesdigital.org/search/kimetsu+no+yaiba/",
                "https://animesdigital.org/search/demon+slayer/",
                "https://animesdigital.org/anime/a/demon-slayer?odr=1",
            ]
        );
        assert!(events.iter().any(|event| matches!(
            event,
            ProgressEvent::CandidatesFound { count: 1, .. }
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            ProgressEvent::CandidatesRanked { count: 1 }
        )));
    }

    #[test]
    fn test_unreachable_catalog_yields_no_sources() {
        let site = AnimesDigital::new();
        let fetcher = StaticFetcher::new();
        let config = ResolverConfig::default();
        let resolver = Resolver::new(&site, &fetcher, &config);

        assert!(resolver.resolve(&demon_slayer(), 1).is_empty());
        assert!(
            resolver
                .resolve(&CanonicalTitle::new(None, None, 1), 1)
                .is_empty()
        );
    }

    #[test]
    fn test_search_retries_without_subtitle() {
        let site = AnimesDigital::new();
        let fetcher =
            StaticFetcher::new().with_page("https://animesdigital.org/search/Naruto/", "<p></p>");
        let config = ResolverConfig::default();
        let resolver = Resolver::new(&site, &fetcher, &config);

        assert_eq!(
            resolver.search_markup("Naruto: Shippuden").as_deref(),
            Some("<p></p>")
        );
        assert_eq!(resolver.search_markup("Bleach"), None);
    }

    #[test]
    fn test_strict_site_skips_other_seasons() {
        let site = AnimeFhd::new();
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://animefhd.com/?s=kimetsu no yaiba 2",
                r#"<div class="SectionBusca">
                     <div class="ultAnisContainerItem">
                       <a href="/anime/kny" title="Kimetsu no Yaiba"></a>
                       <div class="aniNome">Kimetsu no Yaiba</div>
                     </div>
                     <div class="ultAnisContainerItem">
                       <a href="/anime/kny-2" title="Kimetsu no Yaiba 2"></a>
                       <div class="aniNome">Kimetsu no Yaiba 2 Dublado</div>
                     </div>
                   </div>"#,
            )
            .with_page(
                "https://animefhd.com/anime/kny-2",
                r#"<div class="sectionEpiInAnime">
                     <a href="/video/kny-2-01">Episódio 01</a>
                     <a href="/video/kny-2-02">Episódio 02</a>
                   </div>"#,
            )
            .with_page(
                "https://animefhd.com/video/kny-2-01",
                r#"<video><source src="https://cdn.example/kny2-01.mp4"></video>"#,
            );
        let config = ResolverConfig::default();
        let resolver = Resolver::new(&site, &fetcher, &config);

        let canonical = CanonicalTitle::new(None, Some("Kimetsu no Yaiba".to_string()), 2);
        let sources = resolver.resolve(&canonical, 1);

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].release_title, "kimetsu no yaiba - Ep 1");
        assert_eq!(sources[0].language_code, 3);
        assert_eq!(
            sources[0].media_reference.to_string(),
            "https://cdn.example/kny2-01.mp4|Referer=https://animefhd.com/"
        );
        assert!(
            !fetcher
                .requested()
                .contains(&"https://animefhd.com/anime/kny".to_string())
        );
    }
}
