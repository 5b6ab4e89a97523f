//! JSON file backed title store

use super::{CanonicalTitle, MetadataError, TitleStore};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A title store loaded from a JSON file.
///
/// The file holds a single object mapping show identifiers to canonical
/// titles:
///
/// ```json
/// {
///   "38000": { "name": "Demon Slayer", "alt_name": "Kimetsu no Yaiba", "season": 1 }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonTitleStore {
    titles: HashMap<String, CanonicalTitle>,
}

impl JsonTitleStore {
    /// Loads all titles from the given file
    pub fn open(path: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path).map_err(|e| MetadataError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let titles = serde_json::from_str(&content).map_err(|e| MetadataError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self { titles })
    }
}

impl TitleStore for JsonTitleStore {
    fn canonical_title(&self, show_id: &str) -> Result<CanonicalTitle, MetadataError> {
        self.titles
            .get(show_id)
            .cloned()
            .ok_or_else(|| MetadataError::ShowNotFound(show_id.to_string()))
    }
}
