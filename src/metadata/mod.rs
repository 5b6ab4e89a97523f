//! Canonical title lookup
//!
//! This module provides the canonical title record of a show, which the
//! resolution pipeline treats as ground truth for matching, as well as the
//! stores that map show identifiers to those records.
mod json;
mod memory;

pub use json::JsonTitleStore;
pub use memory::MemoryTitleStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during title lookups.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No record exists for the requested show
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    /// The title file could not be read
    #[error("Failed to read title file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The title file does not contain valid JSON
    #[error("Failed to parse title file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The known names and season of a show.
///
/// At least one of `name` and `alt_name` should be present for a lookup to
/// produce any search queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTitle {
    /// The primary (usually English) title
    #[serde(default)]
    pub name: Option<String>,
    /// An alternate (usually romanized) title
    #[serde(default, alias = "ename")]
    pub alt_name: Option<String>,
    /// Season number, starting at 1
    #[serde(default = "default_season", deserialize_with = "deserialize_season")]
    pub season: u32,
}

fn default_season() -> u32 {
    1
}

/// Missing, null or zero seasons all mean the first season
fn deserialize_season<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let season: Option<u32> = Option::deserialize(deserializer)?;
    Ok(season.unwrap_or(1).max(1))
}

impl CanonicalTitle {
    /// Creates a canonical title, clamping the season to at least 1.
    pub fn new(name: Option<String>, alt_name: Option<String>, season: u32) -> Self {
        Self {
            name,
            alt_name,
            season: season.max(1),
        }
    }

    /// The title used for display purposes, preferring the primary name
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.alt_name.as_deref())
    }
}

/// Trait for stores that map show identifiers to canonical titles.
pub trait TitleStore {
    /// Looks up the canonical title of a show.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ShowNotFound`] if the store has no record for
    /// `show_id`.
    fn canonical_title(&self, show_id: &str) -> Result<CanonicalTitle, MetadataError>;
}
