//! Site configuration module.
//!
//! Loads and validates `config.toml` from the project root. All options are
//! optional except the directories the pipeline cannot run without — a
//! blank layout or output directory is a fatal validation error reported
//! before any file is processed.
//!
//! ```toml
//! # All options shown with their defaults
//!
//! content_dir = "content"       # Source pages and assets
//! layout_dir = "layouts"        # Reusable wrapping templates
//! components_dir = "components" # Optional template fragments
//! output_dir = "_site"          # Rendered site destination
//!
//! default_layout = "main"       # Applied when a page has no `layout` key;
//!                               # empty string = no default
//! include_drafts = false        # Include pages marked `"published": false`
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown
//! keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults; user config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding pages and assets.
    pub content_dir: String,
    /// Directory holding layout templates. Required, must not be blank.
    pub layout_dir: String,
    /// Directory holding reusable template fragments (optional on disk).
    pub components_dir: String,
    /// Directory the rendered site is written to. Required, must not be blank.
    pub output_dir: String,
    /// Layout applied to pages without a `layout` key. Empty = none.
    pub default_layout: String,
    /// Include pages marked `"published": false`.
    pub include_drafts: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            layout_dir: "layouts".to_string(),
            components_dir: "components".to_string(),
            output_dir: "_site".to_string(),
            default_layout: "main".to_string(),
            include_drafts: false,
        }
    }
}

impl SiteConfig {
    /// Check the directories the pipeline cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "layout_dir must not be blank".to_string(),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    pub fn content_path(&self, root: &Path) -> PathBuf {
        root.join(&self.content_dir)
    }

    pub fn layout_path(&self, root: &Path) -> PathBuf {
        root.join(&self.layout_dir)
    }

    pub fn components_path(&self, root: &Path) -> PathBuf {
        root.join(&self.components_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }
}

/// Load config from `<root>/config.toml`, falling back to stock defaults
/// when the file doesn't exist. The result is always validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join("config.toml");
    let config = if path.exists() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.output_dir, "_site");
        assert!(!config.include_drafts);
    }

    #[test]
    fn partial_config_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "output_dir = \"public\"\ninclude_drafts = true\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output_dir, "public");
        assert!(config.include_drafts);
        assert_eq!(config.layout_dir, "layouts");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "outpt_dir = \"typo\"\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn blank_layout_dir_fails_validation() {
        let config = SiteConfig {
            layout_dir: "  ".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn blank_output_dir_fails_validation() {
        let config = SiteConfig {
            output_dir: String::new(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
