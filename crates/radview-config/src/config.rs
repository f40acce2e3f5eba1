//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base URL of the monitoring platform.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default radon warning threshold in Bq/m3.
const DEFAULT_WARNING_THRESHOLD: f64 = 150.0;

/// Default radon alert threshold in Bq/m3.
const DEFAULT_ALERT_THRESHOLD: f64 = 200.0;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the platform API, with a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Radon value above which a reading is a warning (Bq/m3).
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    /// Radon value above which a reading is an alert (Bq/m3).
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    /// Environment variables override whatever the file contains.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from RADVIEW_* environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("RADVIEW_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(base_url) = std::env::var("RADVIEW_API_BASE_URL") {
            self.api_base_url = base_url;
        }
        if let Ok(threshold) = std::env::var("RADVIEW_WARNING_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                self.warning_threshold = value;
            }
        }
        if let Ok(threshold) = std::env::var("RADVIEW_ALERT_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                self.alert_threshold = value;
            }
        }
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }
}
