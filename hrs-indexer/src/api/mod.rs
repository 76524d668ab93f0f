//! HTTP API handlers for hrs-indexer

pub mod health;
pub mod indexing;

pub use health::health_routes;
pub use indexing::indexing_routes;
