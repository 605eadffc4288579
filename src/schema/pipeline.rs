//! Render pipeline declarations.
//!
//! A pipeline is one named build pass: it selects content types, decides how
//! much of each content is exposed (scopes), runs named queries, paginates
//! iterators and hands every resolved context to a template engine.
//!
//! # Example
//! ```yaml
//! id: html
//! contentTypes:
//!   exclude: [author]
//!   lastUpdate: [post]
//! scopes:
//!   "*":
//!     list:
//!       context: [properties, relations]
//!       fields: [slug, title]
//! queries:
//!   featured:
//!     contentType: post
//!     filter: { key: featured, operator: equals, value: true }
//! iterators:
//!   post.pagination:
//!     contentType: post
//!     limit: 10
//! dateFormats:
//!   year: "%Y"
//! transformers:
//!   post: [prettier]
//! engine:
//!   id: json
//!   options: { pretty: true }
//! output:
//!   path: "{{slug}}"
//!   file: index
//!   ext: json
//! ```

use super::query::{Condition, Order, Query};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Scope key matching every content type.
pub const WILDCARD: &str = "*";

/// Sub-contexts a scope may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextPart {
    Properties,
    Body,
    Relations,
    Queries,
}

/// Named projection of a content's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scope {
    #[serde(rename = "context", default)]
    pub exposes: BTreeSet<ContextPart>,

    /// Keys kept in the final context; empty keeps everything
    #[serde(rename = "fields", default, skip_serializing_if = "Vec::is_empty")]
    pub field_allow_list: Vec<String>,
}

impl Scope {
    pub fn new(parts: &[ContextPart]) -> Self {
        Self {
            exposes: parts.iter().copied().collect(),
            field_allow_list: Vec::new(),
        }
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.field_allow_list = fields.iter().map(|f| (*f).to_owned()).collect();
        self
    }

    pub fn exposes(&self, part: ContextPart) -> bool {
        self.exposes.contains(&part)
    }

    /// Built-in scope for a well-known scope name.
    pub fn builtin(name: &str) -> Option<Self> {
        use ContextPart::*;
        match name {
            "reference" => Some(Self::new(&[Properties])),
            "list" => Some(Self::new(&[Properties, Relations])),
            "detail" => Some(Self::new(&[Properties, Body, Relations, Queries])),
            _ => None,
        }
    }
}

/// Which content types a pipeline renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentTypeFilter {
    /// Types to render; empty means every type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Types whose newest `lastUpdate` becomes `site.lastUpdate`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub last_update: Vec<String>,
}

impl ContentTypeFilter {
    pub fn is_eligible(&self, content_type: &str) -> bool {
        (self.include.is_empty() || self.include.iter().any(|t| t == content_type))
            && !self.exclude.iter().any(|t| t == content_type)
    }
}

/// Pagination of one content type's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IteratorConfig {
    pub content_type: String,

    pub limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,
}

impl IteratorConfig {
    /// The query selecting this iterator's items (without limit).
    pub fn query(&self) -> Query {
        Query {
            content_type: self.content_type.clone(),
            scope: None,
            limit: None,
            offset: None,
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
        }
    }
}

/// Template engine selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub id: String,

    /// Opaque engine options
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

/// Output path templates: `render(path)/file.ext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: String,
    pub file: String,
    pub ext: String,
}

/// One named build pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderPipeline {
    pub id: String,

    /// content type (or `*`) -> scope name -> scope
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scopes: BTreeMap<String, BTreeMap<String, Scope>>,

    #[serde(rename = "queries", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_queries: BTreeMap<String, Query>,

    #[serde(rename = "contentTypes", default)]
    pub content_type_filter: ContentTypeFilter,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub iterators: BTreeMap<String, IteratorConfig>,

    /// name -> chrono format, applied to every date in the contexts
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub date_formats: BTreeMap<String, String>,

    /// content type -> transformer names, run in order over each body
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transformers: BTreeMap<String, Vec<String>>,

    pub engine: EngineConfig,

    pub output: OutputConfig,
}

impl RenderPipeline {
    pub fn new(id: impl Into<String>, engine: &str, output: OutputConfig) -> Self {
        Self {
            id: id.into(),
            scopes: BTreeMap::new(),
            named_queries: BTreeMap::new(),
            content_type_filter: ContentTypeFilter::default(),
            iterators: BTreeMap::new(),
            date_formats: BTreeMap::new(),
            transformers: BTreeMap::new(),
            engine: EngineConfig {
                id: engine.to_owned(),
                options: serde_json::Value::Null,
            },
            output,
        }
    }

    /// Resolve a scope by name for a content type.
    ///
    /// Lookup order: the content type's scopes, the `*` scopes, the built-in
    /// scope of the same name, and finally `reference`.
    pub fn scope(&self, content_type: &str, name: &str) -> Scope {
        [content_type, WILDCARD]
            .iter()
            .find_map(|key| self.scopes.get(*key).and_then(|s| s.get(name)))
            .cloned()
            .or_else(|| Scope::builtin(name))
            .unwrap_or_else(|| Scope::new(&[ContextPart::Properties]))
    }
}
