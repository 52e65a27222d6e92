//! Grid configuration.
//!
//! Tuning knobs for the widgets (debounce windows, suggestion gate, page
//! sizes) with serde-backed TOML persistence under the platform config
//! directory. Hosts that do not care get the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// Reading the config file failed.
    #[error("failed to read configuration: {0}")]
    Read(#[source] std::io::Error),

    /// Writing the config file failed.
    #[error("failed to write configuration: {0}")]
    Write(#[source] std::io::Error),

    /// The config file is not valid TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serializing the configuration failed.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Widget tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Default rows per page.
    pub page_size: u32,
    /// Page sizes offered by the page-size selector.
    pub page_sizes: Vec<u32>,
    /// Settle window before a committed search fires, in milliseconds.
    pub search_debounce_ms: u64,
    /// Settle window before a suggestion fetch fires, in milliseconds.
    pub suggest_debounce_ms: u64,
    /// Minimum query length before suggestions are fetched.
    pub suggest_min_chars: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_sizes: vec![10, 20, 50],
            search_debounce_ms: 600,
            suggest_debounce_ms: 300,
            suggest_min_chars: 2,
        }
    }
}

impl GridConfig {
    /// Load from the default config path.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::Write)
    }

    /// The default config file path (`<config dir>/lazygrid/config.toml`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("lazygrid").join("config.toml"))
    }

    /// The committed-search settle window.
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// The suggestion-fetch settle window.
    pub fn suggest_delay(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }
}
