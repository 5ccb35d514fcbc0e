//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::client::CANONICAL_BASE_URL;
use crate::coordinator::RefreshConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wakatime: WakatimeConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WakaTime account configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WakatimeConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    CANONICAL_BASE_URL.to_string()
}

impl Default for WakatimeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
        }
    }
}

/// Refresh coordinator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Longest accepted refresh period (one week)
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

fn default_update_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: default_update_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

impl CoordinatorConfig {
    /// Convert to the coordinator's runtime settings
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            update_interval: Duration::from_secs(self.update_interval_minutes.saturating_mul(60)),
            timeout: Duration::from_secs(self.timeout_secs),
            ..RefreshConfig::default()
        }
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8095
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("wakatime-sensors").join("config.toml")),
            Some(PathBuf::from("/etc/wakatime-sensors/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check that the configuration can drive a coordinator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wakatime.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "wakatime.api_key is required (or set WAKATIME_API_KEY)".to_string(),
            ));
        }
        if self.coordinator.update_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "coordinator.update_interval_minutes must be greater than 0".to_string(),
            ));
        }
        if self.coordinator.update_interval_minutes > MAX_UPDATE_INTERVAL_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "coordinator.update_interval_minutes must be at most {}",
                MAX_UPDATE_INTERVAL_MINUTES
            )));
        }
        if self.coordinator.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "coordinator.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // WakaTime overrides
        if let Ok(api_key) = std::env::var("WAKATIME_API_KEY") {
            self.wakatime.api_key = api_key;
        }
        if let Ok(base_url) = std::env::var("WAKATIME_BASE_URL") {
            self.wakatime.base_url = base_url;
        }

        // Coordinator overrides
        if let Ok(interval) = std::env::var("WAKATIME_UPDATE_INTERVAL_MINUTES") {
            if let Ok(m) = interval.parse() {
                self.coordinator.update_interval_minutes = m;
            }
        }
        if let Ok(timeout) = std::env::var("WAKATIME_TIMEOUT_SECS") {
            if let Ok(s) = timeout.parse() {
                self.coordinator.timeout_secs = s;
            }
        }

        // API overrides
        if let Ok(host) = std::env::var("WAKATIME_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("WAKATIME_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WAKATIME_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WAKATIME_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# WakaTime Sensors Configuration
#
# Environment variables override these settings:
# - WAKATIME_API_KEY
# - WAKATIME_BASE_URL
# - WAKATIME_UPDATE_INTERVAL_MINUTES
# - WAKATIME_TIMEOUT_SECS
# - WAKATIME_API_HOST
# - WAKATIME_API_PORT
# - WAKATIME_LOG_LEVEL
# - WAKATIME_LOG_FORMAT

[wakatime]
# API key from https://wakatime.com/settings/api-key
api_key = ""

# API root. Anything other than the hosted API is treated as a self-hosted
# server (e.g. Wakapi): "/compat/wakatime/v1" is appended and the key is
# base64-encoded.
base_url = "https://wakatime.com/api/v1"

[coordinator]
# Minutes between refreshes
update_interval_minutes = 30

# Deadline for fetching all endpoints in one refresh (seconds)
timeout_secs = 10

[api]
# HTTP host
host = "0.0.0.0"

# HTTP port
port = 8095

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/wakatime-sensors/wakatime-sensors.log"
"#
    .to_string()
}
