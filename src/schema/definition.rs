//! Content type definitions.

use super::{property::Property, query::Query, relation::Relation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema of one content type.
///
/// # Example
/// ```yaml
/// id: post
/// paths:
///   - blog
/// properties:
///   title:
///     type: string
///   featured:
///     type: bool
///     required: false
///     default: false
/// relations:
///   authors:
///     references: author
///     type: many
/// queries:
///   related:
///     contentType: post
///     limit: 4
///     filter:
///       key: tags
///       operator: matching
///       value: "{{tags}}"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentDefinition {
    pub id: String,

    /// Whether this type is assigned to contents no other type claims
    #[serde(rename = "default", default = "crate::config::defaults::r#false")]
    pub is_default: bool,

    /// Content id prefixes owned by this type
    #[serde(rename = "paths", default, skip_serializing_if = "Vec::is_empty")]
    pub source_paths: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, Relation>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<String, Query>,
}

impl ContentDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_default: false,
            source_paths: Vec::new(),
            properties: BTreeMap::new(),
            relations: BTreeMap::new(),
            queries: BTreeMap::new(),
        }
    }

    pub const fn default_type(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn path(mut self, prefix: impl Into<String>) -> Self {
        self.source_paths.push(prefix.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, property: Property) -> Self {
        self.properties.insert(key.into(), property);
        self
    }

    pub fn relation(mut self, key: impl Into<String>, relation: Relation) -> Self {
        self.relations.insert(key.into(), relation);
        self
    }

    pub fn query(mut self, name: impl Into<String>, query: Query) -> Self {
        self.queries.insert(name.into(), query);
        self
    }

    /// Whether a content id falls under one of this type's source paths.
    ///
    /// Matches whole path segments: `blog` owns `blog/hello` but not `blogroll`.
    pub fn owns_path(&self, content_id: &str) -> bool {
        self.source_paths.iter().any(|prefix| {
            let prefix = prefix.trim_matches('/');
            !prefix.is_empty()
                && content_id
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}
