//! Search query planning
//!
//! Catalog sites only offer a free-text search, so a canonical title has to
//! be turned into the few query strings most likely to hit the right entry.

use super::normalize;
use crate::metadata::CanonicalTitle;
use once_cell::sync::Lazy;
use regex::Regex;

/// Season indicator and everything following it
static SEASON_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:season|\d+(?:st|nd|rd|th)\s*season|temporada|s)\b.*")
        .expect("season suffix regex should compile")
});

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\s*$").expect("trailing number regex should compile"));

/// The queries to send to a catalog, and the titles to rank results against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    /// Search strings in the order they should be tried
    pub queries: Vec<String>,
    /// Titles the search results are scored against
    ///
    /// These keep the original spelling and the season number, which helps
    /// scoring but tends to hurt a site's search engine.
    pub probes: Vec<String>,
}

/// Builds the search queries and similarity probes for a canonical title.
///
/// The alternate name is planned first because catalog sites more often use
/// the romanized title. The name is skipped when it equals the alternate
/// name. `season` is passed separately since the caller may have inferred a
/// better value than the one stored with the title.
pub fn build_queries(canonical: &CanonicalTitle, season: u32) -> QueryPlan {
    let mut plan = QueryPlan::default();

    let name = canonical.name.as_deref().filter(|n| !n.trim().is_empty());
    let alt_name = canonical
        .alt_name
        .as_deref()
        .filter(|n| !n.trim().is_empty());

    let mut titles = Vec::with_capacity(2);
    if let Some(alt_name) = alt_name {
        titles.push(alt_name);
    }
    if let Some(name) = name
        && Some(name) != alt_name
    {
        titles.push(name);
    }

    for title in titles {
        let cleaned = normalize(title);
        let base = SEASON_SUFFIX.replace(&cleaned, "").trim().to_string();

        let query = build_search_title(&base, season);
        if !query.is_empty() && !plan.queries.contains(&query) {
            plan.queries.push(query);
        }

        plan.probes.push(title.to_string());
        plan.probes.push(format!("{} {}", base, season));
    }

    plan
}

/// Appends the season number to a normalized base title.
///
/// The number is only added for seasons after the first, and never when the
/// title already ends in a number.
///
/// # Examples
///
/// ```
/// use source_sleuth::title::build_search_title;
///
/// assert_eq!(build_search_title("one piece", 1), "one piece");
/// assert_eq!(build_search_title("one piece", 3), "one piece 3");
/// assert_eq!(build_search_title("one piece 3", 3), "one piece 3");
/// ```
pub fn build_search_title(base: &str, season: u32) -> String {
    if season > 1 && !TRAILING_NUMBER.is_match(base) {
        format!("{} {}", base, season)
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn title(name: Option<&str>, alt_name: Option<&str>, season: u32) -> CanonicalTitle {
        CanonicalTitle {
            name: name.map(str::to_string),
            alt_name: alt_name.map(str::to_string),
            season,
        }
    }

    #[test]
    fn test_alt_name_is_queried_first() {
        let canonical = title(Some("Demon Slayer"), Some("Kimetsu no Yaiba"), 1);
        let plan = build_queries(&canonical, 1);

        assert_eq!(plan.queries, vec!["kimetsu no yaiba", "demon slayer"]);
        assert_eq!(
            plan.probes,
            vec![
                "Kimetsu no Yaiba",
                "kimetsu no yaiba 1",
                "Demon Slayer",
                "demon slayer 1"
            ]
        );
    }

    #[test]
    fn test_season_appended_after_first_season() {
        let canonical = title(Some("One Piece"), None, 3);
        let plan = build_queries(&canonical, 3);
        assert_eq!(plan.queries, vec!["one piece 3"]);

        let plan = build_queries(&canonical, 1);
        assert_eq!(plan.queries, vec!["one piece"]);
    }

    #[test]
    fn test_season_suffix_is_cut_before_appending() {
        let canonical = title(None, Some("Shingeki no Kyojin Season 3 Part 2"), 3);
        let plan = build_queries(&canonical, 3);

        assert_eq!(plan.queries, vec!["shingeki no kyojin 3"]);
        assert_eq!(plan.probes[1], "shingeki no kyojin 3");
    }

    #[test]
    fn test_duplicate_and_missing_names_are_skipped() {
        let canonical = title(Some("Naruto"), Some("Naruto"), 1);
        assert_eq!(build_queries(&canonical, 1).queries, vec!["naruto"]);

        let canonical = title(Some("NARUTO"), Some("Naruto"), 1);
        assert_eq!(build_queries(&canonical, 1).queries, vec!["naruto"]);

        let canonical = title(None, None, 1);
        assert_eq!(build_queries(&canonical, 1), QueryPlan::default());
    }
}
