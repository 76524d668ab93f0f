//! Sync pipeline services and collaborator implementations

pub mod aggregation;
pub mod batch_orchestrator;
pub mod csv_source;
pub mod elastic_client;
pub mod merge_engine;
pub mod review_builder;
pub mod sync_service;
pub mod tone_analyzer_client;
pub mod value_coercion;

pub use aggregation::aggregate;
pub use batch_orchestrator::{group_by_hotel, BatchOrchestrator, HotelRows, SyncError, SyncOptions};
pub use csv_source::CsvReviewSource;
pub use elastic_client::ElasticDocumentStore;
pub use merge_engine::MergeEngine;
pub use review_builder::build_review;
pub use sync_service::SyncService;
pub use tone_analyzer_client::{ToneAnalyzerClient, ToneAnalyzerConfig};
pub use value_coercion::{coerce, CanonicalValue, ValueKind};
