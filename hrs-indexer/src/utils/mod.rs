//! Utility modules for hrs-indexer

pub mod retry;

pub use retry::retry_with_backoff;
