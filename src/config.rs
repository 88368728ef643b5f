//! Runtime configuration.
//!
//! Settings are read from TOML at `~/.config/launch-atlas/config.toml`
//! (or XDG equivalent), then overridden by `ATLAS_*` environment variables
//! and finally by command-line flags.
//!
//! # Example Configuration
//!
//! ```toml
//! data_path = "data/space_missions.csv"
//! delimiter = ","
//! success_rule = "exact"
//! heatmap_top_n = 20
//! histogram_min_count = 50
//! log_filter = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SuccessRule;
use crate::store::LoadOptions;

/// Environment variable overriding `data_path`.
pub const ENV_DATA: &str = "ATLAS_DATA";
/// Environment variable overriding `log_filter`.
pub const ENV_LOG: &str = "ATLAS_LOG";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Launch table to load.
    pub data_path: PathBuf,
    /// Field delimiter; exactly one ASCII character.
    pub delimiter: String,
    /// How `success-rate` decides a launch succeeded.
    pub success_rule: SuccessRule,
    /// Companies shown by the activity view when `--top` is not given.
    pub heatmap_top_n: i64,
    /// Company/Rocket histograms keep values seen more than this many times.
    pub histogram_min_count: u64,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/space_missions.csv"),
            delimiter: ",".to_string(),
            success_rule: SuccessRule::Exact,
            heatmap_top_n: 20,
            histogram_min_count: 50,
            log_filter: "warn".to_string(),
        }
    }
}

impl AtlasConfig {
    /// Load from the default location, or defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from a specific path, or defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path.
    ///
    /// Uses XDG conventions:
    /// - Primary: `$XDG_CONFIG_HOME/launch-atlas/config.toml`
    /// - Fallback: platform-specific config dir
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config)
                .join("launch-atlas")
                .join("config.toml"));
        }

        dirs::config_dir()
            .map(|p| p.join("launch-atlas").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Apply `ATLAS_DATA` / `ATLAS_LOG` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data) = lookup(ENV_DATA).filter(|v| !v.trim().is_empty()) {
            self.data_path = PathBuf::from(data);
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
    }

    /// Check field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("data_path cannot be empty".into()));
        }
        self.delimiter_byte()?;
        if self.heatmap_top_n <= 0 {
            return Err(ConfigError::Validation(
                "heatmap_top_n must be positive".into(),
            ));
        }
        Ok(())
    }

    fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(ConfigError::Validation(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    /// Loader settings derived from this config.
    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            delimiter: self.delimiter_byte()?,
        })
    }
}
