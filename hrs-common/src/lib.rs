//! # HRS Common Library
//!
//! Shared code for the Hotel Review Sync services:
//! - Error type used across crates
//! - Configuration loading (TOML file, environment, built-in defaults)
//! - Document identity generation
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod ids;
pub mod time;

pub use error::{Error, Result};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidGenerator};
