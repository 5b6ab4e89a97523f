//! Similarity ranking of search results
//!
//! Catalog searches return loosely related entries, often several seasons of
//! the same show next to each other. This module scores every result against
//! the canonical titles and keeps the ones similar enough to be worth
//! opening.

use crate::catalog::SearchCandidate;
use crate::title::{SeasonPattern, normalize};
use rapidfuzz::distance::indel;

/// Score bonus for results whose title mentions the requested season
pub const SEASON_BOOST: f64 = 0.1;

/// Default minimum score for a result to be kept
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// How strictly results are filtered by season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPolicy {
    /// Keep every result above the threshold
    Lenient,
    /// Additionally drop results whose title names a different season
    ///
    /// Titles without a season marker count as the first season.
    Strict,
}

/// A search result together with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: SearchCandidate,
    /// Best similarity against any probe title, plus the season boost
    pub score: f64,
}

/// Similarity of two titles after normalization, between 0.0 and 1.0.
///
/// The ratio is symmetric and reaches 1.0 for titles that normalize to the
/// same string.
///
/// # Examples
///
/// ```
/// use source_sleuth::ranking::similarity;
///
/// assert_eq!(similarity("Naruto: Season 2", "naruto"), 1.0);
/// assert!(similarity("Naruto", "Bleach") < 0.5);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Scores and filters search results for a requested season.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    policy: RankingPolicy,
    pattern: SeasonPattern,
    threshold: f64,
}

impl Ranker {
    /// Creates a ranker
    ///
    /// `pattern` is used by the strict policy to read the season out of a
    /// result's title.
    pub fn new(policy: RankingPolicy, pattern: SeasonPattern, threshold: f64) -> Self {
        Self {
            policy,
            pattern,
            threshold,
        }
    }

    /// Ranks `candidates` against the probe titles.
    ///
    /// Results scoring below the threshold are dropped, as are results for a
    /// different season under the strict policy. The remaining results are
    /// sorted by descending score; the order of equal scores is unspecified.
    pub fn rank(
        &self,
        candidates: Vec<SearchCandidate>,
        probes: &[String],
        season: u32,
    ) -> Vec<RankedCandidate> {
        let season_text = season.to_string();

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let title = &candidate.display_title;

                let mut score = probes
                    .iter()
                    .filter(|probe| !probe.trim().is_empty())
                    .map(|probe| similarity(title, probe))
                    .fold(0.0_f64, f64::max);
                if title.contains(&season_text) {
                    score += SEASON_BOOST;
                }

                if self.policy == RankingPolicy::Strict {
                    let candidate_season = self.pattern.find(title).unwrap_or(1);
                    if candidate_season != season {
                        tracing::debug!(
                            title = %title,
                            candidate_season,
                            season,
                            "dropping result for another season"
                        );
                        return None;
                    }
                }

                tracing::debug!(title = %title, score, "scored search result");
                (score >= self.threshold).then_some(RankedCandidate { candidate, score })
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}
