//! Configuration resolution for hrs-indexer
//!
//! Each setting resolves with priority command line → `HRS_*` environment →
//! TOML file → built-in default. Flags declared with `env` on [`CliArgs`]
//! cover the first two tiers; the remaining settings read the environment
//! through `hrs_common::config`.

use clap::Parser;
use hrs_common::config::{default_config_path, default_database_path, env_parsed, env_value, resolve, TomlConfig};
use hrs_common::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::services::elastic_client::{DEFAULT_ELASTIC_URL, DEFAULT_INDEX_NAME};
use crate::services::tone_analyzer_client::{ToneAnalyzerConfig, DEFAULT_API_VERSION};
use crate::services::SyncOptions;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9090;
pub const DEFAULT_APP_TITLE: &str = "Hotel Review Sync";
pub const DEFAULT_CSV_PATH: &str = "./resources/sample.csv";
pub const DEFAULT_TONE_API_URL: &str = "https://api.us-east.tone-analyzer.watson.cloud.ibm.com";
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;
pub const DEFAULT_RETRY_BUDGET_MS: u64 = 2000;

/// Log level: `HRS_LOG_LEVEL`, else `[logging] level`
///
/// Resolved on its own because logging starts before the other settings.
pub fn log_level(toml: &TomlConfig) -> String {
    resolve(None, env_value("LOG_LEVEL"), None, toml.logging.level.clone())
}

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "hrs-indexer", version, about = "Sync hotel reviews and tone scores into a document store")]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(long, env = "HRS_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "HRS_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "HRS_PORT")]
    pub port: Option<u16>,

    /// Review dataset (CSV)
    #[arg(long, env = "HRS_CSV_PATH")]
    pub csv_path: Option<PathBuf>,

    /// Document store backend: sqlite or elastic
    #[arg(long, env = "HRS_STORE")]
    pub store: Option<StoreBackend>,
}

impl CliArgs {
    /// Config file to load: `--config`, else the platform default location
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Elastic,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "elastic" | "elasticsearch" => Ok(StoreBackend::Elastic),
            other => Err(format!("unknown store backend '{}' (expected sqlite or elastic)", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Sqlite => f.write_str("sqlite"),
            StoreBackend::Elastic => f.write_str("elastic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToneSettings {
    /// `None` disables scoring
    pub api_key: Option<String>,
    pub api_url: String,
    pub api_version: String,
    pub requests_per_second: u32,
    pub retry_budget_ms: u64,
}

impl ToneSettings {
    pub fn client_config(&self) -> Option<ToneAnalyzerConfig> {
        let api_key = self.api_key.as_ref()?;
        let mut config = ToneAnalyzerConfig::new(api_key.clone(), self.api_url.clone());
        config.api_version = self.api_version.clone();
        config.requests_per_second = self.requests_per_second;
        config.retry_budget_ms = self.retry_budget_ms;
        Some(config)
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub app_title: String,
    pub csv_path: PathBuf,
    pub store: StoreBackend,
    pub database_path: PathBuf,
    pub elastic_url: String,
    pub index_name: String,
    pub tone: ToneSettings,
    pub sync: SyncOptions,
}

impl Settings {
    pub fn resolve(cli: &CliArgs, toml: &TomlConfig) -> Result<Settings> {
        let store = match &toml.store {
            Some(raw) => Some(raw.parse::<StoreBackend>().map_err(Error::Config)?),
            None => None,
        };
        let store = resolve(cli.store, None, store, StoreBackend::default());

        let api_key = env_value("TONE_API_KEY")
            .or_else(|| toml.tone_analyzer.api_key.clone())
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("No tone analyzer API key configured, reviews will be stored without tones");
        }

        let defaults = SyncOptions::default();
        let sync = SyncOptions {
            hotel_concurrency: resolve(
                None,
                env_parsed("HOTEL_CONCURRENCY")?,
                toml.sync.hotel_concurrency,
                defaults.hotel_concurrency,
            ),
            score_concurrency: resolve(
                None,
                env_parsed("SCORE_CONCURRENCY")?,
                toml.sync.score_concurrency,
                defaults.score_concurrency,
            ),
        };
        if sync.hotel_concurrency == 0 || sync.score_concurrency == 0 {
            return Err(Error::Config("concurrency limits must be at least 1".to_string()));
        }

        let tone = ToneSettings {
            api_key,
            api_url: resolve(
                None,
                env_value("TONE_API_URL"),
                toml.tone_analyzer.api_url.clone(),
                DEFAULT_TONE_API_URL.to_string(),
            ),
            api_version: resolve(
                None,
                env_value("TONE_API_VERSION"),
                toml.tone_analyzer.api_version.clone(),
                DEFAULT_API_VERSION.to_string(),
            ),
            requests_per_second: resolve(
                None,
                env_parsed("TONE_REQUESTS_PER_SECOND")?,
                toml.tone_analyzer.requests_per_second,
                DEFAULT_REQUESTS_PER_SECOND,
            ),
            retry_budget_ms: resolve(
                None,
                env_parsed("TONE_RETRY_BUDGET_MS")?,
                toml.tone_analyzer.retry_budget_ms,
                DEFAULT_RETRY_BUDGET_MS,
            ),
        };

        let settings = Settings {
            host: resolve(cli.host.clone(), None, None, DEFAULT_HOST.to_string()),
            port: resolve(cli.port, None, toml.port, DEFAULT_PORT),
            app_title: resolve(None, env_value("APP_TITLE"), toml.app_title.clone(), DEFAULT_APP_TITLE.to_string()),
            csv_path: resolve(cli.csv_path.clone(), None, toml.csv_path.clone(), PathBuf::from(DEFAULT_CSV_PATH)),
            store,
            database_path: resolve(
                None,
                env_value("DATABASE_PATH").map(PathBuf::from),
                toml.database_path.clone(),
                default_database_path(),
            ),
            elastic_url: resolve(None, env_value("ELASTIC_URL"), toml.elastic.url.clone(), DEFAULT_ELASTIC_URL.to_string()),
            index_name: resolve(
                None,
                env_value("INDEX_NAME"),
                toml.elastic.index_name.clone(),
                DEFAULT_INDEX_NAME.to_string(),
            ),
            tone,
            sync,
        };

        info!(
            store = %settings.store,
            csv = %settings.csv_path.display(),
            scoring = settings.tone.api_key.is_some(),
            "Configuration resolved"
        );

        Ok(settings)
    }
}
