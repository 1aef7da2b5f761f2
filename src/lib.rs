//! Notes Learner - A flashcard learning library for markdown topic files.
//!
//! This library provides the core functionality for the `nl` CLI tool,
//! including topic parsing, persistence of topics and nuggets, completion
//! tracking, and streak calculation.

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
pub mod clock;
#[cfg(not(target_arch = "wasm32"))]
pub mod commands;
pub mod config;
pub mod events;
pub mod models;
pub mod parser;
pub mod storage;
pub mod store;
#[cfg(not(target_arch = "wasm32"))]
pub mod watch;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use parser::FormatError;

/// Test utilities shared by the unit tests.
#[cfg(test)]
pub(crate) mod test_utils {
    use chrono::{DateTime, FixedOffset};

    use crate::clock::FixedClock;
    use crate::storage::MemoryBucket;
    use crate::store::Store;

    /// A two-card topic used across the store tests.
    pub const JS_DOC: &str = "---\nname: JS\ncolor: \"#F7DF1E\"\n---\n\nT: What is a closure?\nD: A function with access to outer scope.\n\nT: What is hoisting?\nD: Moving declarations to the top.\n";

    /// A single-card topic unrelated to [`JS_DOC`].
    pub const RUST_DOC: &str =
        "---\nname: Rust Basics\n---\n\nT: What is a borrow?\nD: A reference to a value.\n";

    /// Parse an RFC 3339 timestamp for a [`FixedClock`].
    pub fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    /// Store over a fresh in-memory bucket with a clock pinned to `ts`.
    pub fn store_at(ts: &str) -> Store<MemoryBucket> {
        Store::new(MemoryBucket::new()).with_clock(FixedClock::new(at(ts)))
    }
}

/// Library-level error type for Notes Learner operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Notes Learner operations.
pub type Result<T> = std::result::Result<T, Error>;
