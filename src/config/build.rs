//! `[build]` section configuration.
//!
//! Input and output directories plus the date locale used when converting
//! front matter.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in site.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "contents"     # Content sources
/// types = "types"          # Content type documents
/// pipelines = "pipelines"  # Pipeline documents
/// output = "dist"          # Output directory
///
/// [build.date]
/// input = "%Y-%m-%d"
/// timezone = "+02:00"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Content source directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Content type definition directory.
    #[serde(default = "defaults::build::types")]
    #[educe(Default = defaults::build::types())]
    pub types: PathBuf,

    /// Render pipeline directory.
    #[serde(default = "defaults::build::pipelines")]
    #[educe(Default = defaults::build::pipelines())]
    pub pipelines: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Front-matter date parsing.
    #[serde(default)]
    pub date: DateConfig,
}

/// `[build.date]` section - how front-matter dates are read.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct DateConfig {
    /// Default chrono format for date properties.
    #[serde(default = "defaults::build::date::input")]
    #[educe(Default = defaults::build::date::input())]
    pub input: String,

    /// Offset applied to dates without one (e.g. "+02:00", "Z").
    #[serde(default = "defaults::build::date::timezone")]
    #[educe(Default = defaults::build::date::timezone())]
    pub timezone: String,
}
