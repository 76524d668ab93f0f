//! Document identity generation
//!
//! A hotel document's id is issued once, on first creation, and never
//! changes afterwards. Generation sits behind a trait so tests can supply
//! deterministic ids.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh, unique document identities
pub trait IdGenerator: Send + Sync {
    /// Issue an id distinct from every id previously issued by this generator
    fn generate(&self) -> String;
}

/// Issues random UUIDv4 strings
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Issues `prefix-1`, `prefix-2`, ... in call order
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
