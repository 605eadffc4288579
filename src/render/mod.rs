//! Phase 2: per-pipeline context assembly.
//!
//! # Architecture
//!
//! ```text
//! RenderPipeline
//!     │
//!     ├── eligible contents (contentTypes include/exclude)
//!     │       │
//!     │       └── iterator templates ──► iterator::expand() ──► pages
//!     │
//!     ├── par_iter ──► Assembler::assemble(content, detail)
//!     │                    │
//!     │                    ├── properties / body / relations / queries
//!     │                    └── scope downgrade on every expansion
//!     │
//!     └── ContextBundle { content, context, destination }
//! ```
//!
//! Assembly is a pure function of the finished content store and the
//! pipeline, so contents are processed in parallel with rayon and share no
//! mutable state. Warnings are returned per content and merged afterwards.

pub mod body;
pub mod context;
pub mod engine;
pub mod output;
pub mod scope;

pub use body::{ContentRenderer, PassThrough, RenderedBody};
pub use context::Assembler;
pub use engine::{EngineRegistry, JsonEngine, TemplateEngine};
pub use scope::Level;

use crate::{
    config::TransformerConfig,
    content::{Content, ContentStore},
    error::Warning,
    iterator,
    schema::{ContentDefinition, RenderPipeline},
    utils::date::DateLocale,
};
use rayon::prelude::*;
use serde_json::{Value, json};
use std::{borrow::Cow, collections::BTreeMap, path::PathBuf};

/// Site-wide values exposed under `site`.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub base_url: String,
    pub title: String,
    pub language: String,
    /// Build start, seconds since the UNIX epoch
    pub generated_at: f64,
}

/// Fully resolved input of one output artifact.
#[derive(Debug)]
pub struct ContextBundle<'a> {
    /// Borrowed from the store, or owned for synthesized iterator pages
    pub content: Cow<'a, Content>,
    /// `{page, site, pipeline}`
    pub context: Value,
    /// Relative to the output directory
    pub destination: PathBuf,
}

/// Bundles of one pipeline and the warnings raised while assembling them.
#[derive(Debug, Default)]
pub struct PipelineOutput<'a> {
    pub bundles: Vec<ContextBundle<'a>>,
    pub warnings: Vec<Warning>,
}

/// Shared, read-only inputs of phase 2.
pub struct RenderEnv<'a> {
    pub store: &'a ContentStore,
    pub definitions: &'a [ContentDefinition],
    pub transformers: &'a BTreeMap<String, TransformerConfig>,
    pub renderer: &'a dyn ContentRenderer,
    pub locale: &'a DateLocale,
    pub site: &'a SiteInfo,
}

/// Assemble every context of one pipeline.
pub fn assemble_pipeline<'a>(pipeline: &'a RenderPipeline, env: &RenderEnv<'a>) -> PipelineOutput<'a> {
    let mut eligible: Vec<&'a Content> = env
        .store
        .iter()
        .filter(|c| pipeline.content_type_filter.is_eligible(&c.content_type))
        .collect();
    eligible.sort_by(|a, b| (&a.content_type, &a.id).cmp(&(&b.content_type, &b.id)));

    let units: Vec<Cow<'a, Content>> = eligible
        .into_iter()
        .flat_map(|content| expand_templates(content, pipeline, env))
        .collect();

    let assembler = Assembler {
        pipeline,
        store: env.store,
        definitions: env.definitions,
        transformers: env.transformers,
        renderer: env.renderer,
        locale: env.locale,
        base_url: &env.site.base_url,
    };
    let site = site_context(pipeline, env, &assembler);
    let pipeline_context = json!({ "id": pipeline.id });

    let results: Vec<(ContextBundle<'a>, Vec<Warning>)> = units
        .into_par_iter()
        .map(|content| {
            let (page, warnings) = assembler.assemble(&content, Level::Detail);
            let destination = output::destination(&pipeline.output, &content);
            let context = json!({
                "page": page,
                "site": site,
                "pipeline": pipeline_context,
            });
            (
                ContextBundle {
                    content,
                    context,
                    destination,
                },
                warnings,
            )
        })
        .collect();

    let mut out = PipelineOutput::default();
    for (bundle, warnings) in results {
        out.bundles.push(bundle);
        out.warnings.extend(warnings);
    }
    out
}

/// Replace an iterator template by its pages; other contents pass through.
fn expand_templates<'a>(
    content: &'a Content,
    pipeline: &RenderPipeline,
    env: &RenderEnv<'_>,
) -> Vec<Cow<'a, Content>> {
    let Some((name, config)) = iterator::template_of(content, pipeline) else {
        return vec![Cow::Borrowed(content)];
    };
    // an unknown item type was reported before rendering; it paginates nothing
    let pages = iterator::expand(content, name, config, env.store, env.locale, &env.site.base_url)
        .unwrap_or_else(|_| {
            iterator::paginate(content, name, config.limit, Vec::new(), &env.site.base_url)
        });
    pages.into_iter().map(Cow::Owned).collect()
}

/// The `site` sub-context.
///
/// `lastUpdate` is the newest `lastUpdate` among the pipeline's
/// `contentTypes.lastUpdate` types, or among all contents when none are
/// listed. It is absent for an empty site.
fn site_context(pipeline: &RenderPipeline, env: &RenderEnv<'_>, assembler: &Assembler<'_>) -> Value {
    let tracked = &pipeline.content_type_filter.last_update;
    let last_update = env
        .store
        .iter()
        .filter(|c| tracked.is_empty() || tracked.contains(&c.content_type))
        .map(Content::last_update)
        .max_by(f64::total_cmp);

    json!({
        "baseUrl": env.site.base_url,
        "title": env.site.title,
        "language": env.site.language,
        "lastUpdate": last_update.map_or(Value::Null, |ts| assembler.date(ts)),
        "generatedAt": assembler.date(env.site.generated_at),
    })
}
