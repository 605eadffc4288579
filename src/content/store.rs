//! Flat id → content lookup, grouped by content type.
//!
//! The store is built once at the end of phase 1 and is read-only afterwards,
//! so phase-2 workers share it by reference without locking.

use super::Content;
use crate::schema::ContentDefinition;
use rustc_hash::FxHashMap;

/// Arena of every content in the build.
#[derive(Debug, Default)]
pub struct ContentStore {
    /// content type -> contents in input order
    collections: FxHashMap<String, Vec<Content>>,
    /// content type -> id -> index into the collection
    index: FxHashMap<String, FxHashMap<String, usize>>,
}

impl ContentStore {
    /// Build the store. Contents keep their relative input order per type.
    ///
    /// Every defined type gets a collection, even when it has no contents.
    pub fn new(definitions: &[ContentDefinition], contents: Vec<Content>) -> Self {
        let mut store = Self::default();
        for definition in definitions {
            store.collections.entry(definition.id.clone()).or_default();
            store.index.entry(definition.id.clone()).or_default();
        }
        for content in contents {
            let collection = store
                .collections
                .entry(content.content_type.clone())
                .or_default();
            store
                .index
                .entry(content.content_type.clone())
                .or_default()
                .insert(content.id.clone(), collection.len());
            collection.push(content);
        }
        store
    }

    /// Every content of a type, or `None` for an unknown type.
    pub fn collection(&self, content_type: &str) -> Option<&[Content]> {
        self.collections.get(content_type).map(Vec::as_slice)
    }

    /// Look up one content by type and id.
    pub fn get(&self, content_type: &str, id: &str) -> Option<&Content> {
        let position = *self.index.get(content_type)?.get(id)?;
        self.collections.get(content_type)?.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Content> {
        self.collections.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
