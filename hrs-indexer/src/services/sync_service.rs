//! Sync entry points: index all hotels, index one hotel, analyze one hotel
//!
//! Loads rows from the review source and hands them to the orchestrator.

use std::sync::Arc;

use crate::models::HotelSummary;
use crate::services::batch_orchestrator::{BatchOrchestrator, SyncError};
use crate::types::ReviewSource;

pub struct SyncService {
    source: Arc<dyn ReviewSource>,
    orchestrator: BatchOrchestrator,
}

impl SyncService {
    pub fn new(source: Arc<dyn ReviewSource>, orchestrator: BatchOrchestrator) -> Self {
        Self { source, orchestrator }
    }

    /// Sync every hotel in the dataset
    pub async fn index_all(&self) -> Result<Vec<HotelSummary>, SyncError> {
        let rows = self.source.load(None).await?;
        if rows.is_empty() {
            tracing::warn!("Review source returned no rows, nothing to index");
        }
        self.orchestrator.index_rows(rows).await
    }

    /// Sync one hotel; an unknown name yields an empty list
    pub async fn index_hotel(&self, hotel_name: &str) -> Result<Vec<HotelSummary>, SyncError> {
        let rows = self.source.load(Some(hotel_name)).await?;
        if rows.is_empty() {
            tracing::info!(hotel = %hotel_name, "No rows for hotel, nothing to index");
        }
        self.orchestrator.index_rows(rows).await
    }

    /// Tones of one hotel from the dataset alone; `None` when it has no rows
    pub async fn analyze_hotel(&self, hotel_name: &str) -> Result<Option<HotelSummary>, SyncError> {
        let rows = self.source.load(Some(hotel_name)).await?;
        Ok(self.orchestrator.analyze_rows(rows, hotel_name).await)
    }
}
