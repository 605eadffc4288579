//! Template engine collaborators.
//!
//! Engines are looked up by the pipeline's `engine.id`. The built-in `json`
//! engine serializes the resolved context itself, which makes it the
//! engine for API-style outputs and for inspecting contexts.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Renders one resolved context into an output document.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, context: &Value, options: &Value) -> Result<String>;
}

/// Serializes the context as JSON.
///
/// Options: `pretty: bool` (default `false`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEngine;

impl TemplateEngine for JsonEngine {
    fn render(&self, context: &Value, options: &Value) -> Result<String> {
        let pretty = options
            .get("pretty")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let output = if pretty {
            serde_json::to_string_pretty(context)
        } else {
            serde_json::to_string(context)
        };
        output.context("Failed to serialize context")
    }
}

/// Engines by id.
pub struct EngineRegistry {
    engines: FxHashMap<String, Box<dyn TemplateEngine>>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("json", JsonEngine);
        registry
    }
}

impl EngineRegistry {
    pub fn empty() -> Self {
        Self {
            engines: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, id: impl Into<String>, engine: impl TemplateEngine + 'static) {
        self.engines.insert(id.into(), Box::new(engine));
    }

    pub fn get(&self, id: &str) -> Option<&dyn TemplateEngine> {
        let engine = self.engines.get(id)?;
        Some(engine.as_ref())
    }
}
