//! Configuration management for threadline

use crate::error::{Result, ThreadlineError};
use crate::types::AuthorId;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default location of the project configuration file
pub const DEFAULT_CONFIG_PATH: &str = ".threadline/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment thread settings
    pub thread: ThreadConfig,
    /// Render settings
    pub render: RenderConfig,
    /// Storage settings
    pub storage: StorageConfig,
    /// Author ids remembered per display name
    pub authors: BTreeMap<String, AuthorId>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ThreadlineError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ThreadlineError::FileNotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.thread.refresh_interval_secs == 0 {
            return Err(ThreadlineError::Config(
                "thread.refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.thread.max_comment_length == 0 {
            return Err(ThreadlineError::Config(
                "thread.max_comment_length must be greater than zero".to_string(),
            ));
        }
        if StrftimeItems::new(&self.render.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ThreadlineError::Config(format!(
                "render.date_format is not a valid format string: {}",
                self.render.date_format
            )));
        }
        Ok(())
    }
}

/// Comment thread configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Poll interval between background refreshes, in seconds
    pub refresh_interval_secs: u64,
    /// Maximum comment content length
    pub max_comment_length: usize,
}

impl ThreadConfig {
    /// Poll interval as a Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5,
            max_comment_length: 10_000,
        }
    }
}

/// Render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default export format
    pub default_format: String,
    /// chrono format string for comment dates
    pub date_format: String,
    /// Show "N replies" next to comments with children
    pub show_reply_counts: bool,
    /// Spaces per nesting level in text output
    pub indent: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            show_reply_counts: true,
            indent: 2,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the comment store; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thread.refresh_interval_secs, 5);
        assert_eq!(config.thread.max_comment_length, 10_000);
        assert_eq!(config.render.date_format, "%Y-%m-%d");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[thread]"));
        assert!(toml.contains("[render]"));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.render.indent, config2.render.indent);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[thread]\nrefresh_interval_secs = 30\n").unwrap();
        assert_eq!(config.thread.refresh_interval_secs, 30);
        assert_eq!(config.thread.max_comment_length, 10_000);
        assert!(config.render.show_reply_counts);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.render.indent = 4;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.render.indent, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");

        assert!(matches!(
            Config::load(&path),
            Err(ThreadlineError::FileNotFound(_))
        ));
        assert_eq!(
            Config::load_or_default(&path).unwrap().thread.refresh_interval_secs,
            5
        );
    }

    #[test]
    fn test_authors_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let id = AuthorId::new();

        let mut config = Config::default();
        config.authors.insert("alice".to_string(), id);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.authors.get("alice"), Some(&id));
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let mut config = Config::default();
        config.render.date_format = "%Q".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[thread]\nrefresh_interval_secs = 0\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ThreadlineError::Config(_))
        ));
    }
}
