//! Collaborator traits and their error types
//!
//! The sync pipeline talks to three external collaborators, each behind a
//! trait so the pipeline can run against real services or in-memory fakes:
//! - **ReviewSource** - yields raw review rows from the dataset
//! - **ToneScorer** - scores one review text into tone categories
//! - **DocumentStore** - looks up and replaces hotel documents

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DocumentId, HotelDocument, RawReviewRow, ToneScore};

// ============================================================================
// Review source
// ============================================================================

/// Errors loading the review dataset (fatal for the batch)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Dataset read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset parse failed: {0}")]
    Parse(String),

    #[error("Dataset loader failed: {0}")]
    Internal(String),
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Load raw rows, restricted to one hotel name when `hotel_name` is given
    ///
    /// An unavailable dataset or a filter matching nothing yields an empty list.
    async fn load(&self, hotel_name: Option<&str>) -> Result<Vec<RawReviewRow>, SourceError>;
}

// ============================================================================
// Tone scorer
// ============================================================================

/// Tone scoring errors (never fatal: the review is kept with no tones)
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Rate limited, unavailable, or network failure
    #[error("Scoring temporarily unavailable: {0}")]
    Transient(String),

    #[error("Scoring not authorized: {0}")]
    Unauthorized(String),

    #[error("Scoring API error {0}: {1}")]
    Api(u16, String),

    #[error("Scoring response parse error: {0}")]
    Parse(String),
}

impl ScoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ScoreError::Transient(_))
    }
}

#[async_trait]
pub trait ToneScorer: Send + Sync {
    /// Scorer name for logging
    fn name(&self) -> &'static str;

    /// Score one review text; an empty list means nothing could be scored
    async fn score(&self, text: &str) -> Result<Vec<ToneScore>, ScoreError>;
}

/// Scorer used when no scoring service is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScorer;

#[async_trait]
impl ToneScorer for NoopScorer {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn score(&self, _text: &str) -> Result<Vec<ToneScore>, ScoreError> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Document store
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    /// Store cannot be reached or the query transport failed
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// A stored document body could not be decoded
    #[error("Stored document is malformed: {0}")]
    Malformed(String),

    /// Whole-document write was rejected
    #[error("Document write failed: {0}")]
    Write(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store backend name for logging
    fn name(&self) -> &'static str;

    /// Look up a hotel's document by exact name
    async fn fetch_by_name(&self, hotel_name: &str) -> Result<Option<HotelDocument>, StoreError>;

    /// Replace (or create) the whole document stored under `id`
    async fn upsert(&self, id: &DocumentId, document: &HotelDocument) -> Result<(), StoreError>;
}
