//! Scope-driven context assembly.
//!
//! A context is a JSON object built from one content at one [`Level`]. The
//! scope registered for that level decides which sub-contexts appear:
//!
//! | Part         | Keys                                                     |
//! |--------------|----------------------------------------------------------|
//! | `properties` | user-defined front matter, `id`, `slug`, `permalink`,    |
//! |              | `lastUpdate`, then declared properties (which win)       |
//! | `relations`  | one key per relation: context, array of contexts or ids  |
//! | `body`       | `body: {html, readingTime, outline}`                     |
//! | `queries`    | `queries: {name: [contexts]}`                            |
//!
//! Iterator pages additionally carry `iterator: {current, total, limit,
//! items, links}`. A non-empty `fields` allow list keeps only the listed
//! top-level keys.
//!
//! # Bounded expansion
//!
//! Related contents and query results are assembled at
//! [`Level::downgrade`] of the current level, and a `reference` context
//! lists identifiers instead of expanding. Recursion depth is therefore at
//! most three, whatever cycles the relations form.

use super::{body::ContentRenderer, scope::Level};
use crate::{
    config::TransformerConfig,
    content::{Content, ContentStore, FIELD_ID, FIELD_LAST_UPDATE, FIELD_SLUG, IteratorInfo},
    error::Warning,
    query,
    schema::{ContextPart, ContentDefinition, Query, RelationType, RenderPipeline, TypedValue},
    transform,
    utils::{date::DateLocale, slug::permalink},
};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

const FIELD_PERMALINK: &str = "permalink";
const KEY_BODY: &str = "body";
const KEY_QUERIES: &str = "queries";
const KEY_ITERATOR: &str = "iterator";

/// Everything context assembly reads. Shared immutably across workers.
pub struct Assembler<'a> {
    pub pipeline: &'a RenderPipeline,
    pub store: &'a ContentStore,
    pub definitions: &'a [ContentDefinition],
    pub transformers: &'a BTreeMap<String, TransformerConfig>,
    pub renderer: &'a dyn ContentRenderer,
    pub locale: &'a DateLocale,
    pub base_url: &'a str,
}

impl Assembler<'_> {
    /// Assemble the context of `content` at `level`.
    ///
    /// Returns the context and the warnings raised while assembling it.
    pub fn assemble(&self, content: &Content, level: Level) -> (Value, Vec<Warning>) {
        let mut warnings = Vec::new();
        let context = self.context(content, level, &mut warnings);
        (Value::Object(context), warnings)
    }

    fn context(&self, content: &Content, level: Level, warnings: &mut Vec<Warning>) -> Map<String, Value> {
        self.project(content, level, level.name(), warnings)
    }

    /// Assemble `content` through the scope named `scope_name`, expanding
    /// relations and queries from `level`.
    fn project(
        &self,
        content: &Content,
        level: Level,
        scope_name: &str,
        warnings: &mut Vec<Warning>,
    ) -> Map<String, Value> {
        let scope = self.pipeline.scope(&content.content_type, scope_name);
        let mut map = Map::new();

        if scope.exposes(ContextPart::Properties) {
            self.properties(content, &mut map);
        }
        if scope.exposes(ContextPart::Relations) {
            self.relations(content, level, &mut map, warnings);
        }
        if scope.exposes(ContextPart::Body) {
            map.insert(KEY_BODY.into(), self.body(content, warnings));
        }
        if scope.exposes(ContextPart::Queries) {
            map.insert(KEY_QUERIES.into(), self.queries(content, level, warnings));
        }
        if let Some(info) = &content.iterator {
            map.insert(KEY_ITERATOR.into(), self.iterator(info, level, warnings));
        }

        if !scope.field_allow_list.is_empty() {
            map.retain(|key, _| scope.field_allow_list.iter().any(|f| f == key));
        }
        map
    }

    // ========================================================================
    // Sub-contexts
    // ========================================================================

    fn properties(&self, content: &Content, map: &mut Map<String, Value>) {
        for (key, value) in &content.user_defined {
            map.insert(key.clone(), self.value(value));
        }
        map.insert(FIELD_ID.into(), Value::String(content.id.clone()));
        map.insert(FIELD_SLUG.into(), Value::String(content.slug.clone()));
        map.insert(
            FIELD_PERMALINK.into(),
            Value::String(permalink(self.base_url, &content.slug)),
        );
        map.insert(FIELD_LAST_UPDATE.into(), self.date(content.last_update()));
        for (key, value) in &content.properties {
            map.insert(key.clone(), self.value(value));
        }
    }

    fn relations(
        &self,
        content: &Content,
        level: Level,
        map: &mut Map<String, Value>,
        warnings: &mut Vec<Warning>,
    ) {
        let definition = self.definition(&content.content_type);

        for (key, relation) in &content.relations {
            let value = match level.downgrade() {
                None => identifiers(relation.relation_type, relation.identifiers.iter().cloned()),
                Some(lower) => {
                    let mut targets: Vec<&Content> = relation
                        .identifiers
                        .iter()
                        .filter_map(|id| self.store.get(&relation.target_type, id))
                        .collect();
                    let order = definition
                        .and_then(|d| d.relations.get(key))
                        .and_then(|r| r.order.as_ref());
                    if let Some(order) = order {
                        targets = query::order(targets, std::slice::from_ref(order));
                    }

                    let mut contexts = targets
                        .into_iter()
                        .map(|target| Value::Object(self.context(target, lower, warnings)));
                    match relation.relation_type {
                        RelationType::One => contexts.next().unwrap_or(Value::Null),
                        RelationType::Many => Value::Array(contexts.collect()),
                    }
                }
            };
            map.insert(key.clone(), value);
        }
    }

    fn body(&self, content: &Content, warnings: &mut Vec<Warning>) -> Value {
        let transformed = match self.pipeline.transformers.get(&content.content_type) {
            Some(names) if !names.is_empty() => {
                let (body, failures) =
                    transform::apply(names, self.transformers, &content.id, &content.body);
                warnings.extend(failures);
                Some(body)
            }
            _ => None,
        };
        let rendered = self
            .renderer
            .render(content, transformed.as_deref().unwrap_or(&content.body));

        json!({
            "html": rendered.html,
            "readingTime": rendered.reading_time,
            "outline": rendered.outline.iter().map(|h| json!({
                "level": h.level,
                "text": h.text,
                "fragment": h.fragment,
            })).collect::<Vec<_>>(),
        })
    }

    /// Definition queries merged with pipeline queries; the pipeline wins.
    ///
    /// A scope name that is not a level selects a pipeline scope for the
    /// results, which are still expanded at the downgraded level.
    fn queries(&self, content: &Content, level: Level, warnings: &mut Vec<Warning>) -> Value {
        let mut queries: BTreeMap<&str, &Query> = BTreeMap::new();
        if let Some(definition) = self.definition(&content.content_type) {
            queries.extend(definition.queries.iter().map(|(k, q)| (k.as_str(), q)));
        }
        queries.extend(self.pipeline.named_queries.iter().map(|(k, q)| (k.as_str(), q)));

        let parameters = content.query_fields();
        let mut map = Map::new();
        for (name, query) in queries {
            // unknown content types were reported once before rendering
            let results =
                query::run(query, &parameters, self.store, self.locale).unwrap_or_default();
            let named = query
                .scope
                .as_deref()
                .filter(|name| Level::from_name(name).is_none());
            let value = match level.for_query(query.scope.as_deref()) {
                None => identifiers(RelationType::Many, results.iter().map(|c| c.id.clone())),
                Some(lower) => Value::Array(
                    results
                        .into_iter()
                        .map(|c| {
                            let scope_name = named.unwrap_or(lower.name());
                            Value::Object(self.project(c, lower, scope_name, warnings))
                        })
                        .collect(),
                ),
            };
            map.insert(name.to_owned(), value);
        }
        Value::Object(map)
    }

    fn iterator(&self, info: &IteratorInfo, level: Level, warnings: &mut Vec<Warning>) -> Value {
        let items = match level.downgrade() {
            None => identifiers(RelationType::Many, info.items.iter().map(|c| c.id.clone())),
            Some(lower) => Value::Array(
                info.items
                    .iter()
                    .map(|c| Value::Object(self.context(c, lower, warnings)))
                    .collect(),
            ),
        };
        json!({
            "current": info.current,
            "total": info.total,
            "limit": info.limit,
            "items": items,
            "links": info.links.iter().map(|link| json!({
                "number": link.number,
                "permalink": link.permalink,
                "isCurrent": link.is_current,
            })).collect::<Vec<_>>(),
        })
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn definition(&self, content_type: &str) -> Option<&ContentDefinition> {
        self.definitions.iter().find(|d| d.id == content_type)
    }

    /// JSON view of a value; dates expand to their formatted renderings.
    pub fn value(&self, value: &TypedValue) -> Value {
        match value {
            TypedValue::Date(timestamp) => self.date(*timestamp),
            TypedValue::Array(items) => Value::Array(items.iter().map(|v| self.value(v)).collect()),
            TypedValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.value(v)))
                    .collect(),
            ),
            scalar => scalar.to_json(),
        }
    }

    /// `{timestamp, iso8601, <format name>: formatted}`.
    ///
    /// A format that fails to render is left out.
    pub fn date(&self, timestamp: f64) -> Value {
        let mut map = Map::new();
        map.insert("timestamp".into(), json!(timestamp));
        if let Some(iso) = self.locale.iso8601(timestamp) {
            map.insert("iso8601".into(), Value::String(iso));
        }
        for (name, format) in &self.pipeline.date_formats {
            if let Some(formatted) = self.locale.format(timestamp, format) {
                map.insert(name.clone(), Value::String(formatted));
            }
        }
        Value::Object(map)
    }
}

/// Unexpanded relation view: `one` is an id or null, `many` an id array.
fn identifiers(relation_type: RelationType, ids: impl Iterator<Item = String>) -> Value {
    let mut ids = ids.map(Value::String);
    match relation_type {
        RelationType::One => ids.next().unwrap_or(Value::Null),
        RelationType::Many => Value::Array(ids.collect()),
    }
}
