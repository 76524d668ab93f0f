//! hrs-indexer - Hotel review sync service
//!
//! Loads hotel reviews from a CSV dataset, scores each new review with the
//! tone analyzer, merges them into one document per hotel and stores it.
//! Sync runs are triggered over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hrs_common::config::load_toml_config;
use hrs_common::UuidGenerator;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrs_indexer::config::{log_level, CliArgs, Settings, StoreBackend};
use hrs_indexer::db::{self, SqliteDocumentStore};
use hrs_indexer::services::{
    BatchOrchestrator, CsvReviewSource, ElasticDocumentStore, SyncService, ToneAnalyzerClient,
};
use hrs_indexer::types::{DocumentStore, NoopScorer, ToneScorer};
use hrs_indexer::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config_path = cli.config_path();
    let toml = load_toml_config(&config_path)?;

    // RUST_LOG wins, then HRS_LOG_LEVEL, then [logging] level
    let level = log_level(&toml);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hrs_indexer={level},hrs_common={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hrs-indexer (Hotel Review Sync)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", config_path.display());

    let settings = Settings::resolve(&cli, &toml)?;

    let scorer: Arc<dyn ToneScorer> = match settings.tone.client_config() {
        Some(config) => {
            info!("Tone analyzer: {}", config.base_url);
            Arc::new(ToneAnalyzerClient::new(config).context("Failed to create tone analyzer client")?)
        }
        None => Arc::new(NoopScorer),
    };

    let store: Arc<dyn DocumentStore> = match settings.store {
        StoreBackend::Sqlite => {
            info!("Database: {}", settings.database_path.display());
            let pool = db::init_database_pool(&settings.database_path).await?;
            Arc::new(SqliteDocumentStore::new(pool))
        }
        StoreBackend::Elastic => {
            let store = ElasticDocumentStore::new(&settings.elastic_url, settings.index_name.clone())
                .context("Failed to create Elasticsearch client")?;
            info!("Elasticsearch: {} (index {})", settings.elastic_url, store.index_name());
            Arc::new(store)
        }
    };

    let source = Arc::new(CsvReviewSource::new(settings.csv_path.clone()));
    info!("Review dataset: {}", source.path().display());
    let orchestrator = BatchOrchestrator::new(scorer, store, Arc::new(UuidGenerator), settings.sync);
    let sync = Arc::new(SyncService::new(source, orchestrator));

    let state = AppState::new(sync, settings.app_title.clone());
    let app = hrs_indexer::build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hrs-indexer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
