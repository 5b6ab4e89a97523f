use super::{CanonicalTitle, MetadataError, TitleStore};
use std::collections::HashMap;

/// An in-memory title store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTitleStore {
    titles: HashMap<String, CanonicalTitle>,
}

impl MemoryTitleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the record for `show_id`
    pub fn insert(&mut self, show_id: impl Into<String>, title: CanonicalTitle) {
        self.titles.insert(show_id.into(), title);
    }
}

impl TitleStore for MemoryTitleStore {
    fn canonical_title(&self, show_id: &str) -> Result<CanonicalTitle, MetadataError> {
        self.titles
            .get(show_id)
            .cloned()
            .ok_or_else(|| MetadataError::ShowNotFound(show_id.to_string()))
    }
}
