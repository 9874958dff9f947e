//! Configuration management for mailcompat.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/mailcompat/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reference dataset source and cache settings
    pub dataset: DatasetConfig,
    /// Report output settings
    pub report: ReportConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAILCOMPAT_DATASET_PATH`: Override the local dataset copy
    /// - `MAILCOMPAT_VALIDITY_HOURS`: Override the dataset validity window
    /// - `MAILCOMPAT_EMBED_BASE_URL`: Override the embed link base URL
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MAILCOMPAT_DATASET_PATH") {
            tracing::debug!("Override dataset.cache_path from env: {}", path);
            self.dataset.cache_path = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("MAILCOMPAT_VALIDITY_HOURS") {
            if let Ok(hours) = val.parse() {
                self.dataset.validity_hours = hours;
                tracing::debug!("Override dataset.validity_hours from env: {}", hours);
            }
        }

        if let Some(url) = lookup("MAILCOMPAT_EMBED_BASE_URL") {
            tracing::debug!("Override report.embed_base_url from env: {}", url);
            self.report.embed_base_url = url;
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dataset.validity_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dataset.validity_hours".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.report.embed_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "report.embed_base_url".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mailcompat/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the cache directory path.
    ///
    /// Uses XDG base directories: `~/.cache/mailcompat`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.cache_dir().to_path_buf())
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "mailcompat", "mailcompat").ok_or(ConfigError::NoConfigDir)
}

/// Reference dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Where the external fetcher downloads the dataset from
    pub source_url: String,
    /// Local copy of the dataset JSON
    pub cache_path: Option<PathBuf>,
    /// How long a loaded dataset stays valid before it should be replaced
    pub validity_hours: u64,
}

impl DatasetConfig {
    /// The validity window as a `Duration`.
    #[must_use]
    pub fn validity(&self) -> Duration {
        Duration::from_secs(self.validity_hours.saturating_mul(3600))
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source_url: "https://www.caniemail.com/api/data.json".to_string(),
            cache_path: None,
            validity_hours: 24,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base URL for per-feature embed links
    pub embed_base_url: String,
    /// Re-sort issues by severity then slug after classification
    pub sort_issues: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            embed_base_url: "https://embed.caniemail.com".to_string(),
            sort_issues: true,
        }
    }
}
