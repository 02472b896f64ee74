//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::gamification::GamificationSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub gamification: GamificationSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("wardrobe").to_string_lossy().to_string())
        .unwrap_or_else(|| "./wardrobe_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body (CSV imports included)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Shared secret required on `PUT /subscription` (billing provider sync)
    #[serde(default)]
    pub billing_secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            billing_secret: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
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

        config.validate()?;
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
        for path in Self::search_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Config file locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("wardrobe").join("config.toml")),
            Some(PathBuf::from("/etc/wardrobe/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gamification
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Storage overrides
        if let Ok(data_dir) = std::env::var("WARDROBE_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Ok(host) = std::env::var("WARDROBE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("WARDROBE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(secret) = std::env::var("WARDROBE_BILLING_SECRET") {
            self.api.billing_secret = Some(secret);
        }
        if let Ok(origins) = std::env::var("WARDROBE_CORS_ORIGINS") {
            self.api.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Gamification overrides
        if let Ok(days) = std::env::var("WARDROBE_REVIVAL_DAYS") {
            if let Ok(d) = days.parse() {
                self.gamification.revival_threshold_days = d;
            }
        }
        if let Ok(days) = std::env::var("WARDROBE_SCORE_WINDOW_DAYS") {
            if let Ok(d) = days.parse() {
                self.gamification.score_window_days = d;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WARDROBE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WARDROBE_LOG_FORMAT") {
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
    r#"# Wardrobe Configuration
#
# Environment variables override these settings:
# - WARDROBE_DATA_DIR
# - WARDROBE_API_HOST
# - WARDROBE_API_PORT
# - WARDROBE_CORS_ORIGINS (comma-separated)
# - WARDROBE_BILLING_SECRET
# - WARDROBE_REVIVAL_DAYS
# - WARDROBE_SCORE_WINDOW_DAYS
# - WARDROBE_LOG_LEVEL
# - WARDROBE_LOG_FORMAT

[storage]
# Directory holding wardrobe.db
data_dir = "~/.local/share/wardrobe"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Largest accepted request body in bytes
max_body_bytes = 5242880

# Shared secret the billing provider sends in X-Billing-Secret when it
# syncs a subscription. Subscription sync is refused while unset.
# billing_secret = "change-me"

[gamification]
# Days an item must sit unworn before wearing it counts as a revival
revival_threshold_days = 90

# Lookback window for the Global Wardrobe Score (days)
score_window_days = 90

# Days unworn before the dashboard lists an item as neglected
neglected_days = 90

[gamification.weights]
# Must be non-negative and sum to 1.0
utilization = 0.40
cpw_trend = 0.25
fit = 0.25
revival = 0.10

[gamification.xp]
item_added = 10
wear_logged = 5
outfit_logged = 15
item_revived = 20
profile_completed = 50
streak_week = 50

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
