//! Storage bucket trait and backend types.
//!
//! A bucket is a flat string-to-string store shaped like the browser's
//! `localStorage`:
//! - `MemoryBucket` - In-process map (tests, embedding)
//! - `FileBucket` - One file per key in a data directory (default for the CLI)
//! - `WebStorageBucket` - Browser `localStorage` (wasm feature)

use crate::Result;

/// Trait for buckets that hold the raw serialized store values.
///
/// Implementations do not interpret values. A missing key reads as `None`.
pub trait Bucket {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Available bucket backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory map
    Memory,
    /// Directory of files - ~/.local/share/notes-learner/
    File,
    /// Browser localStorage
    Web,
}

impl BackendType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Web => "web",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
