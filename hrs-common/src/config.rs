//! Configuration loading
//!
//! Values are resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! A missing TOML file is not an error: the service starts with defaults and
//! logs a warning. A TOML file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Prefix shared by every HRS environment variable
pub const ENV_PREFIX: &str = "HRS_";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: Option<u16>,
    /// Title returned by `GET /`
    pub app_title: Option<String>,
    /// Path to the review dataset (CSV)
    pub csv_path: Option<PathBuf>,
    /// Document store backend ("sqlite" or "elastic")
    pub store: Option<String>,
    /// SQLite database file for the sqlite backend
    pub database_path: Option<PathBuf>,
    pub tone_analyzer: ToneAnalyzerToml,
    pub elastic: ElasticToml,
    pub sync: SyncToml,
    pub logging: LoggingConfig,
}

/// `[tone_analyzer]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToneAnalyzerToml {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub api_version: Option<String>,
    /// Maximum scoring requests per second
    pub requests_per_second: Option<u32>,
    /// Total time budget for retrying one transient scoring failure
    pub retry_budget_ms: Option<u64>,
}

/// `[elastic]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElasticToml {
    pub url: Option<String>,
    pub index_name: Option<String>,
}

/// `[sync]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncToml {
    /// Hotels processed concurrently within one batch
    pub hotel_concurrency: Option<usize>,
    /// Scoring calls in flight per hotel
    pub score_concurrency: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load TOML configuration from `path`
///
/// Missing file → defaults (with a warning). Unreadable or malformed file → `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Platform config file location (`~/.config/hrs/config.toml` on Linux)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("hrs").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("./hrs_config.toml"))
}

/// Platform data location for the SQLite document store
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hrs").join("hrs.db"))
        .unwrap_or_else(|| PathBuf::from("./hrs_data/hrs.db"))
}

/// Read `HRS_<name>`, treating empty or whitespace-only values as unset
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Read and parse `HRS_<name>`
///
/// A value that is set but does not parse is a configuration error rather
/// than a silent fallback.
pub fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_value(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}{}={:?}: {}", ENV_PREFIX, name, raw, e))),
        None => Ok(None),
    }
}

/// Pick the first present value in priority order, else the default
pub fn resolve<T>(cli: Option<T>, env: Option<T>, toml: Option<T>, default: T) -> T {
    cli.or(env).or(toml).unwrap_or(default)
}
