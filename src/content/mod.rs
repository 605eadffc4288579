//! Typed content instances and the content graph.
//!
//! # Architecture
//!
//! ```text
//! contents/**/*.md
//!     │
//!     └── source::load_all() ──► RawContent (front matter + body)
//!                                     │
//!                                     ▼
//!                        convert::convert() ──► Content (typed properties)
//!                                     │
//!                                     ▼
//!                 relations::resolve_relations() ──► Content.relations (ids only)
//!                                     │
//!                                     ▼
//!                          ContentStore (id -> Content, per type)
//! ```
//!
//! Cross references are always identifiers resolved through the store, never
//! pointers, so mutually referencing types cannot form ownership cycles.

mod convert;
mod relations;
mod source;
mod store;

pub use convert::{convert, resolve_definition};
pub use relations::resolve_relations;
pub use source::{RawContent, load_all, parse_source};
pub use store::ContentStore;

use crate::schema::{RelationType, TypedValue, ValueMap};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};

/// Synthesized query field: content id.
pub const FIELD_ID: &str = "id";
/// Synthesized query field: content slug.
pub const FIELD_SLUG: &str = "slug";
/// Synthesized query field: last update date.
pub const FIELD_LAST_UPDATE: &str = "lastUpdate";

/// Resolved identifiers of one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationValue {
    pub target_type: String,
    pub relation_type: RelationType,
    pub identifiers: Vec<String>,
}

impl RelationValue {
    /// Query field view: `one` is a single id (or absent), `many` an id array.
    pub fn to_field(&self) -> Option<TypedValue> {
        match self.relation_type {
            RelationType::One => self
                .identifiers
                .first()
                .map(|id| TypedValue::String(id.clone())),
            RelationType::Many => Some(TypedValue::Array(
                self.identifiers
                    .iter()
                    .map(|id| TypedValue::String(id.clone()))
                    .collect(),
            )),
        }
    }
}

/// A link to one page of an iterator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLink {
    pub number: usize,
    pub permalink: String,
    pub is_current: bool,
}

/// Pagination state attached to a synthesized page.
#[derive(Debug, Clone)]
pub struct IteratorInfo {
    /// 1-based page number
    pub current: usize,
    pub total: usize,
    pub limit: usize,
    pub items: Vec<Content>,
    pub links: Vec<PageLink>,
}

/// One typed instance of published material.
#[derive(Debug, Clone)]
pub struct Content {
    /// Path-derived identifier, e.g. `blog/hello`
    pub id: String,
    pub content_type: String,
    pub slug: String,
    pub origin_path: PathBuf,
    /// Seconds since the UNIX epoch
    pub last_modified: f64,
    pub raw_front_matter: ValueMap,
    /// Raw body text after the front matter
    pub body: String,
    /// Declared properties that passed type checking
    pub properties: ValueMap,
    pub relations: BTreeMap<String, RelationValue>,
    /// Front-matter keys the schema does not declare
    pub user_defined: ValueMap,
    /// Set on pages synthesized by an iterator
    pub iterator: Option<IteratorInfo>,
}

impl Content {
    /// The `lastUpdate` date: a declared `lastUpdate` property, else the
    /// file modification time.
    pub fn last_update(&self) -> f64 {
        match self.properties.get(FIELD_LAST_UPDATE) {
            Some(TypedValue::Date(ts)) => *ts,
            _ => self.last_modified,
        }
    }

    /// The flat field view queries are evaluated against.
    ///
    /// Declared properties, relations flattened to ids, and the synthesized
    /// `id`, `slug` and `lastUpdate` fields.
    pub fn query_fields(&self) -> ValueMap {
        let mut fields = self.properties.clone();
        for (key, relation) in &self.relations {
            if let Some(value) = relation.to_field() {
                fields.insert(key.clone(), value);
            }
        }
        fields.insert(FIELD_ID.into(), TypedValue::String(self.id.clone()));
        fields.insert(FIELD_SLUG.into(), TypedValue::String(self.slug.clone()));
        fields.insert(FIELD_LAST_UPDATE.into(), TypedValue::Date(self.last_update()));
        fields
    }
}
