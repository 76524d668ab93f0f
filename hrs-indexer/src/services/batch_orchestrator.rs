//! Batch orchestrator
//!
//! Runs the per-hotel sync pipeline over a batch of raw rows:
//!
//! ```text
//! rows ─▶ group by hotel ─▶ fetch stored document ─▶ score + build reviews
//!      ─▶ merge ─▶ aggregate ─▶ upsert ─▶ summary
//! ```
//!
//! Hotels run concurrently (bounded by `hotel_concurrency`) and scoring calls
//! within one hotel run concurrently (bounded by `score_concurrency`). Both
//! use ordered buffering, so reviews reach the merge step in source order and
//! summaries come back in first-appearance order.
//!
//! **Failure handling:**
//! - Scoring failure: the review is kept with no tones
//! - Write failure: reported on that hotel's summary; other hotels continue
//! - Stored document cannot be decoded: reported on that hotel's summary, nothing written
//! - Store unreachable: aborts the batch
//!
//! The store is read, then written, with no compare-and-swap. Two concurrent
//! syncs of the same hotel can lose each other's new reviews.

use futures::stream::{self, StreamExt, TryStreamExt};
use hrs_common::IdGenerator;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{HotelDocument, HotelSummary, NormTones, RawReviewRow, Review, ToneScore};
use crate::services::aggregation::aggregate;
use crate::services::merge_engine::MergeEngine;
use crate::services::review_builder::{build_review, hotel_meta, hotel_name, review_text};
use crate::types::{DocumentStore, ScoreError, SourceError, StoreError, ToneScorer};

/// Errors that abort a whole batch
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub hotel_concurrency: usize,
    pub score_concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            hotel_concurrency: 4,
            score_concurrency: 4,
        }
    }
}

/// Rows of one hotel, in source order
#[derive(Debug, Clone)]
pub struct HotelRows {
    pub name: String,
    pub rows: Vec<RawReviewRow>,
}

/// Group rows by hotel name, hotels in order of first appearance
pub fn group_by_hotel(rows: Vec<RawReviewRow>) -> Vec<HotelRows> {
    let mut groups: Vec<HotelRows> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let name = hotel_name(&row);
        match index.get(&name) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(name.clone(), groups.len());
                groups.push(HotelRows { name, rows: vec![row] });
            }
        }
    }

    groups
}

pub struct BatchOrchestrator {
    scorer: Arc<dyn ToneScorer>,
    store: Arc<dyn DocumentStore>,
    merge: MergeEngine,
    options: SyncOptions,
}

impl BatchOrchestrator {
    pub fn new(
        scorer: Arc<dyn ToneScorer>,
        store: Arc<dyn DocumentStore>,
        ids: Arc<dyn IdGenerator>,
        options: SyncOptions,
    ) -> Self {
        Self {
            scorer,
            store,
            merge: MergeEngine::new(ids),
            options: SyncOptions {
                hotel_concurrency: options.hotel_concurrency.max(1),
                score_concurrency: options.score_concurrency.max(1),
            },
        }
    }

    /// Sync every hotel present in `rows` and return one summary per hotel
    ///
    /// Hotels with no rows do not appear. Returns `Err` only for failures that
    /// abort the batch (store unreachable).
    pub async fn index_rows(&self, rows: Vec<RawReviewRow>) -> Result<Vec<HotelSummary>, SyncError> {
        let groups = group_by_hotel(rows);
        tracing::info!(
            hotels = groups.len(),
            scorer = self.scorer.name(),
            store = self.store.name(),
            "Starting index batch"
        );

        let summaries: Vec<HotelSummary> = stream::iter(groups)
            .map(|group| self.sync_hotel(group))
            .buffered(self.options.hotel_concurrency)
            .try_collect()
            .await?;

        let failed = summaries.iter().filter(|s| s.error.is_some()).count();
        tracing::info!(hotels = summaries.len(), failed, "Index batch complete");

        Ok(summaries)
    }

    /// Compute a hotel's tones from `rows` alone, without reading or writing the store
    ///
    /// Returns `None` when no row belongs to `hotel_name`.
    pub async fn analyze_rows(&self, rows: Vec<RawReviewRow>, hotel_name: &str) -> Option<HotelSummary> {
        let group = group_by_hotel(rows).into_iter().find(|g| g.name == hotel_name)?;

        let reviews = self.build_reviews(&group.name, &group.rows, &HashSet::new()).await;
        let tones = aggregate(&reviews);
        tracing::info!(hotel = %group.name, reviews = reviews.len(), tones = tones.len(), "Analyzed hotel");

        Some(HotelSummary {
            name: group.name,
            tones,
            error: None,
        })
    }

    async fn sync_hotel(&self, group: HotelRows) -> Result<HotelSummary, SyncError> {
        let HotelRows { name, rows } = group;

        let existing = match self.store.fetch_by_name(&name).await {
            Ok(existing) => existing,
            Err(StoreError::Malformed(msg)) => {
                tracing::error!(hotel = %name, error = %msg, "Stored document unreadable, hotel skipped");
                return Ok(failed_summary(name, NormTones::new(), format!("stored document is malformed: {}", msg)));
            }
            Err(e) => return Err(e.into()),
        };

        let known: HashSet<String> = existing
            .iter()
            .flat_map(|doc| doc.reviews.iter().map(|r| r.text.clone()))
            .collect();

        let new_reviews = self.build_reviews(&name, &rows, &known).await;
        let meta = rows.first().map(hotel_meta).unwrap_or_default();

        let mut document: HotelDocument = self.merge.merge(existing, &name, &meta, new_reviews);
        document.norm_tones = aggregate(&document.reviews);

        match self.store.upsert(&document.id, &document).await {
            Ok(()) => {
                tracing::info!(
                    hotel = %name,
                    doc_id = %document.id,
                    reviews = document.reviews.len(),
                    tones = document.norm_tones.len(),
                    "Indexed hotel"
                );
                Ok(HotelSummary {
                    name,
                    tones: document.norm_tones,
                    error: None,
                })
            }
            Err(e) => {
                tracing::error!(hotel = %name, doc_id = %document.id, error = %e, "Hotel write failed");
                Ok(failed_summary(name, document.norm_tones, e.to_string()))
            }
        }
    }

    /// Score and build reviews for rows whose text is not in `known`
    ///
    /// Repeated texts within `rows` are scored once (first occurrence). Output
    /// keeps source order regardless of which scoring call finishes first.
    async fn build_reviews(&self, hotel: &str, rows: &[RawReviewRow], known: &HashSet<String>) -> Vec<Review> {
        let mut seen: HashSet<String> = HashSet::new();
        // Owned rows: the scoring stream ends up inside handler futures that must be `Send`
        let pending: Vec<(RawReviewRow, String)> = rows
            .iter()
            .map(|row| (row, review_text(row)))
            .filter(|(_, text)| !known.contains(text) && seen.insert(text.clone()))
            .map(|(row, text)| (row.clone(), text))
            .collect();

        tracing::debug!(
            hotel = %hotel,
            rows = rows.len(),
            to_score = pending.len(),
            "Scoring new reviews"
        );

        stream::iter(pending)
            .map(|(row, text): (RawReviewRow, String)| async move {
                let tones = self.score_or_empty(hotel, &text).await;
                build_review(&row, tones)
            })
            .buffered(self.options.score_concurrency)
            .collect()
            .await
    }

    async fn score_or_empty(&self, hotel: &str, text: &str) -> Vec<ToneScore> {
        match self.scorer.score(text).await {
            Ok(tones) => tones,
            Err(e @ ScoreError::Unauthorized(_)) => {
                tracing::error!(hotel = %hotel, scorer = self.scorer.name(), error = %e, "Scoring rejected, review kept without tones");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(hotel = %hotel, scorer = self.scorer.name(), error = %e, "Scoring failed, review kept without tones");
                Vec::new()
            }
        }
    }
}

fn failed_summary(name: String, tones: NormTones, error: String) -> HotelSummary {
    HotelSummary {
        name,
        tones,
        error: Some(error),
    }
}
