//! Build error types.
//!
//! Two severities:
//!
//! | Type              | Severity  | Effect                                  |
//! |-------------------|-----------|-----------------------------------------|
//! | [`ConfigError`]   | fatal     | aborts before any content is loaded     |
//! | [`BuildError`]    | fatal     | aborts before any rendering begins      |
//! | [`Warning`]       | non-fatal | logged, accumulated, value degraded     |
//!
//! `Display` is the developer-facing log message; [`UserFacing`] supplies the
//! message shown to site authors. [`diagnostic_tree`] prints an error and its
//! nested causes.

use crate::schema::{PropertyType, ValueKind};
use std::{error::Error, fmt::Write, io, path::PathBuf};
use thiserror::Error;

/// Message meant for the site author rather than the developer.
pub trait UserFacing {
    fn user_message(&self) -> String;
}

// ============================================================================
// Fatal
// ============================================================================

/// A fatal validation failure. Each variant lists every offender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate content type ids: {}", .0.join(", "))]
    DuplicateContentTypes(Vec<String>),

    #[error("no content type is marked `default`")]
    NoDefaultContentType,

    #[error("multiple default content types: {}", .0.join(", "))]
    MultipleDefaultContentTypes(Vec<String>),

    #[error("duplicate pipeline ids: {}", .0.join(", "))]
    DuplicatePipelines(Vec<String>),

    #[error("duplicate content slugs: {}", .0.join(", "))]
    DuplicateSlugs(Vec<String>),
}

impl UserFacing for ValidationError {
    fn user_message(&self) -> String {
        match self {
            Self::DuplicateContentTypes(ids) => {
                format!("Content types must have unique ids; found duplicates: {}", ids.join(", "))
            }
            Self::NoDefaultContentType => {
                "Mark exactly one content type with `default: true`.".into()
            }
            Self::MultipleDefaultContentTypes(ids) => format!(
                "Only one content type may be the default; these are all marked: {}",
                ids.join(", ")
            ),
            Self::DuplicatePipelines(ids) => {
                format!("Pipelines must have unique ids; found duplicates: {}", ids.join(", "))
            }
            Self::DuplicateSlugs(slugs) => format!(
                "Two or more contents resolve to the same slug: {}",
                slugs.join(", ")
            ),
        }
    }
}

/// An unreadable or inconsistent site configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`", .0.display())]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to decode config")]
    Decode(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl UserFacing for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::Read(path, _) => format!("Could not read the config file {}.", path.display()),
            Self::Decode(err) => format!("The config file is not valid TOML: {}", err.message()),
            Self::Invalid(reason) => format!("The config file is invalid: {reason}"),
        }
    }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("failed to read `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to decode `{}`", .0.display())]
    Decode(PathBuf, #[source] Box<dyn Error + Send + Sync>),
}

impl UserFacing for BuildError {
    fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .map(UserFacing::user_message)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Io(path, _) => format!("Could not read {}.", path.display()),
            Self::Decode(path, _) => format!("{} is not a valid document.", path.display()),
        }
    }
}

// ============================================================================
// Non-fatal
// ============================================================================

/// A non-fatal diagnostic. The build continues with a degraded value.
#[derive(Debug, Error)]
pub enum Warning {
    #[error("{content}: property `{key}` expects {expected}, found {found}")]
    TypeMismatch {
        content: String,
        key: String,
        expected: PropertyType,
        found: ValueKind,
    },

    #[error("{content}: missing required property `{key}`")]
    MissingProperty { content: String, key: String },

    #[error("{content}: property `{key}` value `{value}` does not match date format `{format}`")]
    InvalidDate {
        content: String,
        key: String,
        value: String,
        format: String,
    },

    #[error("query references unknown content type `{0}`")]
    UnknownContentType(String),

    #[error("{content}: relation `{key}` references missing `{target}` id `{id}`")]
    UnresolvedRelation {
        content: String,
        key: String,
        target: String,
        id: String,
    },

    #[error("{content}: transformer `{transformer}` failed")]
    TransformFailed {
        content: String,
        transformer: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("pipeline `{pipeline}`: unknown template engine `{engine}`")]
    UnknownEngine { pipeline: String, engine: String },

    #[error("pipeline `{pipeline}`: rendering `{content}` failed")]
    RenderFailed {
        pipeline: String,
        content: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write `{}`", .0.display())]
    WriteFailed(PathBuf, #[source] io::Error),
}

impl UserFacing for Warning {
    fn user_message(&self) -> String {
        match self {
            Self::TypeMismatch { content, key, expected, .. } => {
                format!("In {content}, `{key}` should be a {expected}; the value was ignored.")
            }
            Self::MissingProperty { content, key } => {
                format!("{content} is missing `{key}`.")
            }
            Self::InvalidDate { content, key, format, .. } => {
                format!("In {content}, `{key}` is not a date in the `{format}` format.")
            }
            Self::UnknownContentType(id) => {
                format!("A query asks for content type `{id}`, which does not exist.")
            }
            Self::UnresolvedRelation { content, key, id, .. } => {
                format!("In {content}, `{key}` points to `{id}`, which does not exist.")
            }
            Self::TransformFailed { content, transformer, .. } => {
                format!("`{transformer}` could not process {content}; the original was kept.")
            }
            Self::UnknownEngine { pipeline, engine } => {
                format!("Pipeline `{pipeline}` uses unknown engine `{engine}` and was skipped.")
            }
            Self::RenderFailed { pipeline, content, .. } => {
                format!("Pipeline `{pipeline}` could not render {content}.")
            }
            Self::WriteFailed(path, _) => format!("Could not write {}.", path.display()),
        }
    }
}

impl Warning {
    /// Log the warning and hand it back for accumulation.
    pub fn emit(self) -> Self {
        crate::log!("warn"; "{}", diagnostic_tree(&self).trim_end());
        self
    }
}

/// Render an error and its `source()` chain as an indented tree.
///
/// ```text
/// pipeline `html`: rendering `blog/a` failed
///   └─ failed to serialize context
///     └─ key must be a string
/// ```
pub fn diagnostic_tree(err: &(dyn Error + 'static)) -> String {
    let mut out = format!("{err}\n");
    let mut depth = 1;
    let mut cause = err.source();
    while let Some(current) = cause {
        let _ = writeln!(out, "{}└─ {current}", "  ".repeat(depth));
        depth += 1;
        cause = current.source();
    }
    out
}
