//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── load_site()                                         phase 1
//!     │       │
//!     │       ├── types/ + pipelines/ ──► loader
//!     │       ├── contents/ ──► RawContent ──► convert + resolve_relations (par)
//!     │       ├── validate() ──► fatal BuildError
//!     │       └── ContentStore + lints (unknown types, unresolved relations)
//!     │
//!     │   ─────────── barrier: the content graph is complete ───────────
//!     │
//!     └── per pipeline                                        phase 2
//!             │
//!             ├── engine lookup (unknown ──► warning, pipeline skipped)
//!             ├── render::assemble_pipeline() ──► ContextBundle (par)
//!             └── engine.render() + write (par)
//! ```
//!
//! `check` stops after phase 1.

use crate::{
    config::SiteConfig,
    content::{self, Content, ContentStore, RawContent},
    error::Warning,
    loader, log,
    render::{self, ContentRenderer, ContextBundle, EngineRegistry, RenderEnv, SiteInfo, TemplateEngine},
    schema::{ContentDefinition, RenderPipeline},
    utils::date::DateLocale,
    validate,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use std::{fs, path::Path};

/// Outcome of a build or check.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Converted contents in the store
    pub contents: usize,
    /// Context bundles assembled across all pipelines
    pub bundles: usize,
    /// Files written to the output directory
    pub written: usize,
    pub warnings: Vec<Warning>,
}

/// The finished content graph of phase 1.
pub struct Site {
    pub definitions: Vec<ContentDefinition>,
    pub pipelines: Vec<RenderPipeline>,
    pub store: ContentStore,
    pub locale: DateLocale,
    pub warnings: Vec<Warning>,
}

/// Run phase 1 and validation only.
pub fn check(config: &SiteConfig) -> Result<BuildReport> {
    let site = load_site(config)?;
    Ok(BuildReport {
        contents: site.store.len(),
        warnings: site.warnings,
        ..BuildReport::default()
    })
}

/// Build the entire site into `config.build.output`.
///
/// Clears the output directory first when `config.build.clean` is set.
pub fn build_site(
    config: &SiteConfig,
    engines: &EngineRegistry,
    renderer: &dyn ContentRenderer,
) -> Result<BuildReport> {
    let site = load_site(config)?;

    let output = &config.build.output;
    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean `{}`", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create `{}`", output.display()))?;

    let info = SiteInfo {
        base_url: config.base.url.clone(),
        title: config.base.title.clone(),
        language: config.base.language.clone(),
        generated_at: now(),
    };
    let env = RenderEnv {
        store: &site.store,
        definitions: &site.definitions,
        transformers: &config.transformers,
        renderer,
        locale: &site.locale,
        site: &info,
    };

    let mut report = BuildReport {
        contents: site.store.len(),
        warnings: site.warnings,
        ..BuildReport::default()
    };

    for pipeline in &site.pipelines {
        let Some(engine) = engines.get(&pipeline.engine.id) else {
            report.warnings.push(
                Warning::UnknownEngine {
                    pipeline: pipeline.id.clone(),
                    engine: pipeline.engine.id.clone(),
                }
                .emit(),
            );
            continue;
        };

        let assembled = render::assemble_pipeline(pipeline, &env);
        report.warnings.extend(assembled.warnings);
        report.bundles += assembled.bundles.len();

        let failures: Vec<Warning> = assembled
            .bundles
            .par_iter()
            .filter_map(|bundle| write_bundle(pipeline, engine, bundle, output).err())
            .collect();
        let written = assembled.bundles.len() - failures.len();
        log!("pipeline"; "{}: wrote {} of {} files", pipeline.id, written, assembled.bundles.len());

        report.written += written;
        report.warnings.extend(failures);
    }

    log!(
        "build";
        "{} contents, {} files written, {} warnings",
        report.contents,
        report.written,
        report.warnings.len()
    );
    Ok(report)
}

// ============================================================================
// Phase 1
// ============================================================================

/// Load, convert, resolve and validate the whole content set.
pub fn load_site(config: &SiteConfig) -> Result<Site> {
    let locale = config.date_locale()?;
    let definitions = loader::load_definitions(&config.build.types)?;
    let pipelines = loader::load_pipelines(&config.build.pipelines)?;
    let raw = content::load_all(&config.build.content)?;
    log!(
        "build";
        "loaded {} sources, {} content types, {} pipelines",
        raw.len(),
        definitions.len(),
        pipelines.len()
    );

    let (contents, mut warnings) = convert_all(raw, &definitions, &locale);
    validate::validate(&definitions, &pipelines, &contents)?;

    let store = ContentStore::new(&definitions, contents);
    warnings.extend(validate::unknown_content_types(&definitions, &pipelines));
    warnings.extend(validate::unresolved_relations(&store));
    log!("convert"; "{} contents ready", store.len());

    Ok(Site {
        definitions,
        pipelines,
        store,
        locale,
        warnings,
    })
}

/// Convert every raw content in parallel, keeping input order.
///
/// A source no definition claims is skipped; that only happens without a
/// default type, which validation reports.
fn convert_all(
    raw: Vec<RawContent>,
    definitions: &[ContentDefinition],
    locale: &DateLocale,
) -> (Vec<Content>, Vec<Warning>) {
    let converted: Vec<(Content, Vec<Warning>)> = raw
        .into_par_iter()
        .filter_map(|raw| {
            let definition = content::resolve_definition(&raw, definitions)?;
            let (mut content, warnings) = content::convert(raw, definition, locale);
            content::resolve_relations(&mut content, definition);
            Some((content, warnings))
        })
        .collect();

    let mut contents = Vec::with_capacity(converted.len());
    let mut warnings = Vec::new();
    for (content, w) in converted {
        contents.push(content);
        warnings.extend(w);
    }
    (contents, warnings)
}

// ============================================================================
// Phase 2
// ============================================================================

fn write_bundle(
    pipeline: &RenderPipeline,
    engine: &dyn TemplateEngine,
    bundle: &ContextBundle<'_>,
    output: &Path,
) -> Result<(), Warning> {
    let document = engine
        .render(&bundle.context, &pipeline.engine.options)
        .map_err(|source| {
            Warning::RenderFailed {
                pipeline: pipeline.id.clone(),
                content: bundle.content.id.clone(),
                source,
            }
            .emit()
        })?;

    let path = output.join(&bundle.destination);
    let written = match path.parent() {
        Some(parent) => fs::create_dir_all(parent).and_then(|()| fs::write(&path, document)),
        None => fs::write(&path, document),
    };
    written.map_err(|err| Warning::WriteFailed(path, err).emit())
}

/// Seconds since the UNIX epoch.
#[allow(clippy::cast_precision_loss)]
fn now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
