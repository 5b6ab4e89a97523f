//! Title normalization
//!
//! Turns a free-form title into the canonical form used for searching and
//! for similarity comparison. Every step is a plain textual substitution over
//! the whole string, applied in a fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

/// "no.8" / "no. 8" style separators between a word and a number
static STRAY_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bno\.\s*(\d)").expect("stray separator regex should compile"));

static ORDINAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:st|nd|rd|th)\b").expect("ordinal suffix regex should compile")
});

/// Season indicator at the very end of the title, with optional number
static TRAILING_SEASON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+\b(?:season|temporada|s)\b\s*\d*\s*$")
        .expect("trailing season regex should compile")
});

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\-_:]").expect("punctuation regex should compile"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Normalizes a title for comparison and search.
///
/// Steps, in order:
/// 1. Lowercase
/// 2. Repair stray separators such as `no.8` into `no 8`
/// 3. Reduce ordinals to their digits (`2nd` becomes `2`)
/// 4. Drop a trailing season indicator (`season`, `temporada`, `s`) and its number
/// 5. Replace `.`, `-`, `_` and `:` with spaces
/// 6. Collapse whitespace and trim
///
/// The season indicator is only removed at the end of the string, so titles
/// that contain the word elsewhere keep it. The function is idempotent.
///
/// # Examples
///
/// ```
/// use source_sleuth::title::normalize;
///
/// assert_eq!(normalize("Naruto: Season 2"), "naruto");
/// assert_eq!(normalize("Kaiju No.8"), "kaiju no 8");
/// ```
pub fn normalize(title: &str) -> String {
    let lowered = title.to_lowercase();
    let repaired = STRAY_SEPARATOR.replace_all(&lowered, "no $1");
    let without_ordinals = ORDINAL_SUFFIX.replace_all(&repaired, "$1");
    let without_season = strip_trailing_season(&without_ordinals);
    let spaced = PUNCTUATION.replace_all(&without_season, " ");
    // Punctuation may expose new ordinals ("3rd_season") and trailing
    // indicators ("title season.2")
    let spaced = ORDINAL_SUFFIX.replace_all(&spaced, "$1");
    let spaced = strip_trailing_season(&spaced);

    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

fn strip_trailing_season(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let stripped = TRAILING_SEASON.replace(&current, "").trim().to_string();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}
