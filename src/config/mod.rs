//! Site configuration management for `site.toml`.
//!
//! # Sections
//!
//! | Section                 | Purpose                                        |
//! |-------------------------|------------------------------------------------|
//! | `[base]`                | Site metadata (title, url, language)           |
//! | `[build]`               | Input/output directories                       |
//! | `[build.date]`          | Front-matter date format and timezone          |
//! | `[transformers.<name>]` | External commands run over content bodies      |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! url = "https://example.com"
//!
//! [build]
//! content = "contents"
//! output = "dist"
//!
//! [build.date]
//! input = "%Y-%m-%d %H:%M"
//! timezone = "+01:00"
//!
//! [transformers.prettier]
//! command = ["npx", "prettier", "--write", "{{file}}"]
//! ```

mod base;
mod build;
pub mod defaults;

pub use base::BaseConfig;
pub use build::{BuildConfig, DateConfig};
use crate::{
    cli::{Cli, Commands},
    error::ConfigError,
    utils::date::{DateLocale, parse_offset},
};
use anyhow::{Result, bail};
use chrono::format::{Item, StrftimeItems};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// `[transformers.<name>]` - an external command run over a content body.
///
/// The body is written to a temporary file whose path replaces `{{file}}`
/// in the arguments (or is appended when no argument mentions it). The
/// command edits the file in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformerConfig {
    pub command: Vec<String>,
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Project root directory (set from the CLI)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// External body transformers by name
    #[serde(default)]
    pub transformers: BTreeMap<String, TransformerConfig>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        if let Commands::Build { output, clean } = &cli.command {
            Self::update_option(&mut self.build.output, output.as_ref());
            self.build.clean |= *clean;
        }

        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every directory against the root and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config: &Path) {
        let root = Self::normalize_path(root);
        self.config_path = Self::normalize_path(&root.join(config));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.types = Self::normalize_path(&root.join(&self.build.types));
        self.build.pipelines = Self::normalize_path(&root.join(&self.build.pipelines));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// The date locale front matter is converted with.
    pub fn date_locale(&self) -> Result<DateLocale> {
        let Some(offset) = parse_offset(&self.build.date.timezone) else {
            bail!(ConfigError::Invalid(format!(
                "[build.date.timezone] `{}` is not a valid offset",
                self.build.date.timezone
            )));
        };
        Ok(DateLocale::new(self.build.date.input.clone(), offset))
    }

    /// Validate configuration values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        if !self.build.content.is_dir() {
            bail!(ConfigError::Invalid(format!(
                "[build.content] `{}` is not a directory",
                self.build.content.display()
            )));
        }

        if StrftimeItems::new(&self.build.date.input).any(|item| matches!(item, Item::Error)) {
            bail!(ConfigError::Invalid(format!(
                "[build.date.input] `{}` is not a valid date format",
                self.build.date.input
            )));
        }
        self.date_locale()?;

        for (name, transformer) in &self.transformers {
            if transformer.command.is_empty() {
                bail!(ConfigError::Invalid(format!(
                    "[transformers.{name}.command] must have at least one element"
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_transformers_section() {
        let config = SiteConfig::from_str(
            r#"
            [transformers.upper]
            command = ["tr", "a-z", "A-Z"]
            "#,
        )
        .unwrap();
        assert_eq!(config.transformers["upper"].command, ["tr", "a-z", "A-Z"]);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(SiteConfig::from_str("[serve]\nport = 1").is_err());
    }

    #[test]
    fn test_date_locale() {
        let mut config = SiteConfig::default();
        config.build.date.timezone = "+02:00".into();
        let locale = config.date_locale().unwrap();
        assert_eq!(locale.offset.local_minus_utc(), 7200);
        assert_eq!(locale.format, "%Y-%m-%d");

        config.build.date.timezone = "Mars/Olympus".into();
        assert!(config.date_locale().is_err());
    }

    #[test]
    fn test_update_with_cli_resolves_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("contents")).unwrap();

        let cli = Cli::parse_from([
            "toucan",
            "--root",
            root.to_str().unwrap(),
            "build",
            "--output",
            "public",
            "--clean",
        ]);
        let mut config = SiteConfig::default();
        config.update_with_cli(&cli);

        let root = root.canonicalize().unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.build.content, root.join("contents"));
        assert_eq!(config.build.output, root.join("public"));
        assert_eq!(config.config_path, root.join("site.toml"));
        assert!(config.build.clean);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.content = dir.path().to_path_buf();
        assert!(config.validate().is_ok());

        config.build.date.input = "%Y-%".into();
        assert!(config.validate().is_err());

        config.build.date.input = "%Y".into();
        config.transformers.insert(
            "empty".into(),
            TransformerConfig {
                command: Vec::new(),
            },
        );
        assert!(config.validate().is_err());

        config.build.content = dir.path().join("missing");
        config.transformers.clear();
        assert!(config.validate().is_err());
    }
}
