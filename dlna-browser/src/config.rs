//! Persistent settings
//!
//! Read from `<config dir>/dlna-browser/config.json`. Every field has a
//! default, so a partial file only overrides what it names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dlna_discovery::{DiscoveryConfig, MEDIA_RENDERER_TARGET, MEDIA_SERVER_TARGET};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_DIR: &str = "dlna-browser";
const CONFIG_FILE: &str = "config.json";

/// What to do with a browse result that answers an older request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Apply every result to whatever directory is on screen
    #[default]
    ApplyAlways,
    /// Drop results whose request is no longer the latest one
    DiscardMismatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub discovery_timeout_ms: u64,
    pub search_targets: Vec<String>,
    /// Listen for ssdp:alive / ssdp:byebye between searches
    pub listen_for_notifications: bool,
    /// Browse page size; 0 is rejected
    pub browse_page_size: u32,
    pub stale_policy: StalePolicy,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Volume change per key press, 1..=100
    pub volume_step: u16,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_ms: 3000,
            search_targets: vec![MEDIA_SERVER_TARGET.to_string(), MEDIA_RENDERER_TARGET.to_string()],
            listen_for_notifications: true,
            browse_page_size: 200,
            stale_policy: StalePolicy::ApplyAlways,
            connect_timeout_ms: 5000,
            read_timeout_ms: 10_000,
            volume_step: 5,
        }
    }
}

impl BrowserConfig {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        let config: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |e: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        std::fs::write(path, json).map_err(io_error)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browse_page_size == 0 {
            return Err(ConfigError::Invalid("browse_page_size must be positive".to_string()));
        }
        if self.discovery_timeout_ms == 0 || self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.search_targets.iter().all(|target| target.trim().is_empty()) {
            return Err(ConfigError::Invalid("at least one search target is required".to_string()));
        }
        if !(1..=100).contains(&self.volume_step) {
            return Err(ConfigError::Invalid(format!(
                "volume_step {} is outside 1..=100",
                self.volume_step
            )));
        }
        Ok(())
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            timeout: self.discovery_timeout(),
            search_targets: self
                .search_targets
                .iter()
                .map(|target| target.trim().to_string())
                .filter(|target| !target.is_empty())
                .collect(),
        }
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
