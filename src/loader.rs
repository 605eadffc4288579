//! Schema document loading.
//!
//! Content-type and pipeline documents are one file per document:
//!
//! | Extension       | Decoder      |
//! |-----------------|--------------|
//! | `.yml`, `.yaml` | `serde_yaml` |
//! | `.toml`         | `toml`       |
//!
//! Other files are ignored. Documents are returned in path order so builds
//! are reproducible.

use crate::schema::{ContentDefinition, RenderPipeline};
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Load every content-type document below `dir`.
pub fn load_definitions(dir: &Path) -> Result<Vec<ContentDefinition>> {
    load_documents(dir).context("Failed to load content types")
}

/// Load every pipeline document below `dir`.
pub fn load_pipelines(dir: &Path) -> Result<Vec<RenderPipeline>> {
    load_documents(dir).context("Failed to load pipelines")
}

fn load_documents<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.is_dir() {
        bail!("`{}` is not a directory", dir.display());
    }
    document_paths(dir)
        .iter()
        .map(|path| load_document(path))
        .collect()
}

/// Schema documents below `dir`, sorted by path.
fn document_paths(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| Format::of(p).is_some())
        .collect();
    paths.sort();
    paths
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read `{}`", path.display()))?;
    match Format::of(path) {
        Some(Format::Yaml) => serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to decode `{}`", path.display())),
        Some(Format::Toml) => toml::from_str(&text)
            .with_context(|| format!("Failed to decode `{}`", path.display())),
        None => bail!("`{}` is not a schema document", path.display()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}
