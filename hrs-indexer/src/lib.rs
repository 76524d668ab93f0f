//! hrs-indexer library interface
//!
//! Exposes the sync pipeline and the HTTP router for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod types;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::http::{header, Method, Uri};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{SyncError, SyncService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<SyncService>,
    /// Returned by `GET /`
    pub app_title: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last batch-aborting error, reported by `/health`
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(sync: Arc<SyncService>, app_title: impl Into<String>) -> Self {
        Self {
            sync,
            app_title: app_title.into(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember a batch-aborting error for `/health`, then hand the result back
    pub async fn record_failure<T>(&self, result: Result<T, SyncError>) -> ApiResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(error = %e, "Sync batch aborted");
                *self.last_error.write().await = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(api::indexing_routes())
        .merge(api::health_routes())
        .fallback(|uri: Uri| async move { ApiError::NotFound(format!("no route for {}", uri)) })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
