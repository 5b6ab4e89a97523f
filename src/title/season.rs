//! Season inference from title strings

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SEASON_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:season|temporada|s)\s*(\d+)|(\d+)(?:st|nd|rd|th)\s*(?:season|temporada|s))",
    )
    .expect("season marker regex should compile")
});

static SEASON_MARKERS_OR_TRAILING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:season|temporada|s)\s*(\d+)|(\d+)(?:st|nd|rd|th)\s*(?:season|temporada|s))|\s*(\d+)\s*$",
    )
    .expect("trailing season regex should compile")
});

/// The pattern family used to find a season number in a title.
///
/// Catalog sites differ in how they name later seasons. Some append a bare
/// number ("Kimetsu no Yaiba 2"), others only ever spell out the season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonPattern {
    /// `Season 2`, `S2`, `Temporada 2`, `2nd Season`
    Markers,
    /// Everything [`SeasonPattern::Markers`] accepts, plus a bare trailing number
    MarkersOrTrailingNumber,
}

impl SeasonPattern {
    /// Returns the first season number found in `title`, if any.
    pub fn find(&self, title: &str) -> Option<u32> {
        let regex = match self {
            SeasonPattern::Markers => &*SEASON_MARKERS,
            SeasonPattern::MarkersOrTrailingNumber => &*SEASON_MARKERS_OR_TRAILING,
        };

        regex
            .captures(title)
            .and_then(|caps| first_number(&caps))
    }
}

fn first_number(caps: &Captures<'_>) -> Option<u32> {
    caps.iter()
        .skip(1)
        .flatten()
        .find_map(|group| group.as_str().parse().ok())
}

/// Infers a season number from a list of titles.
///
/// Titles are scanned in order and the first one carrying a season marker
/// decides the result. Absent titles are skipped. When nothing matches,
/// `default` is returned; a missing marker is not an error.
///
/// # Examples
///
/// ```
/// use source_sleuth::title::{SeasonPattern, infer_season};
///
/// let pattern = SeasonPattern::MarkersOrTrailingNumber;
/// assert_eq!(infer_season([Some("Attack on Titan 2nd Season")], pattern, 1), 2);
/// assert_eq!(infer_season([Some("Attack on Titan")], pattern, 1), 1);
/// ```
pub fn infer_season<'a, I>(titles: I, pattern: SeasonPattern, default: u32) -> u32
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    titles
        .into_iter()
        .flatten()
        .find_map(|title| pattern.find(title).filter(|season| *season >= 1))
        .unwrap_or(default)
}
