//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/methane-monitor/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset location
    #[serde(default)]
    pub data: DataConfig,

    /// Analytics tuning
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Dataset location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON sample dataset; the XDG data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Analytics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Maximum districts in a ranking
    #[serde(default = "default_district_ranking_limit")]
    pub district_ranking_limit: usize,

    /// Strongest/weakest correlation pairs to report
    #[serde(default = "default_top_correlations")]
    pub top_correlations: usize,

    /// Default percentile for extreme event detection
    #[serde(default = "default_extreme_threshold_percentile")]
    pub extreme_threshold_percentile: f64,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format of the analyze command
    #[serde(default = "default_format")]
    pub format: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_district_ranking_limit() -> usize {
    DEFAULT_DISTRICT_RANKING_LIMIT
}
fn default_top_correlations() -> usize {
    DEFAULT_TOP_CORRELATIONS
}
fn default_extreme_threshold_percentile() -> f64 {
    DEFAULT_EXTREME_THRESHOLD_PERCENTILE
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            district_ranking_limit: default_district_ranking_limit(),
            top_correlations: default_top_correlations(),
            extreme_threshold_percentile: default_extreme_threshold_percentile(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Default dataset path: ~/.local/share/methane-monitor/samples.json
    pub fn default_data_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME).join(DATA_FILE_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Dataset path, configured or default
    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data.path {
            Some(path) => Ok(path.clone()),
            None => Self::default_data_path(),
        }
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(&path, self.to_toml()?).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["data", "path"] => self.data_path().ok().map(|p| p.display().to_string()),

            ["analytics", "district_ranking_limit"] => {
                Some(self.analytics.district_ranking_limit.to_string())
            }
            ["analytics", "top_correlations"] => Some(self.analytics.top_correlations.to_string()),
            ["analytics", "extreme_threshold_percentile"] => {
                Some(self.analytics.extreme_threshold_percentile.to_string())
            }

            ["output", "format"] => Some(self.output.format.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["data", "path"] => {
                self.data.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            ["analytics", "district_ranking_limit"] => {
                self.analytics.district_ranking_limit = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid ranking limit: {}", value))
                })?;
            }
            ["analytics", "top_correlations"] => {
                self.analytics.top_correlations = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid correlation count: {}", value))
                })?;
            }
            ["analytics", "extreme_threshold_percentile"] => {
                let percentile: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid percentile: {}", value))
                })?;
                if !(percentile > 0.0 && percentile <= 100.0) {
                    return Err(Error::Config(format!(
                        "Percentile must be in (0, 100], got {}",
                        value
                    )));
                }
                self.analytics.extreme_threshold_percentile = percentile;
            }

            ["output", "format"] => {
                if !matches!(value, "json" | "text") {
                    return Err(Error::Config(format!("Unknown output format: {}", value)));
                }
                self.output.format = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "data.path",
            "analytics.district_ranking_limit",
            "analytics.top_correlations",
            "analytics.extreme_threshold_percentile",
            "output.format",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
