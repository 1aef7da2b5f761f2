//! Storage layer for Notes Learner data.
//!
//! The store persists everything through a [`Bucket`], a flat key-value
//! area modeled on browser `localStorage`. Three logical keys are used:
//!
//! - `notes-learner-data` - topics and nuggets (`{"topics": [...], "nuggets": [...]}`)
//! - `notes-learner-progress` - completion state keyed by nugget ID
//! - `notes-learner-streak` - last computed streak, as a decimal string
//!
//! ## Backends
//!
//! - **File backend** (default for the CLI): one file per key under
//!   `~/.local/share/notes-learner/`, overridable with `NL_DATA_DIR`
//! - **Memory backend**: shared in-process map
//! - **Web backend**: browser `localStorage` (wasm builds only)

pub mod backend;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod memory;

pub use backend::{BackendType, Bucket};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileBucket;
pub use memory::MemoryBucket;

use crate::{Error, Result};
use std::path::PathBuf;

/// Bucket key holding the topic/nugget collection.
pub const DATA_KEY: &str = "notes-learner-data";

/// Bucket key holding the progress map.
pub const PROGRESS_KEY: &str = "notes-learner-progress";

/// Bucket key holding the cached streak.
pub const STREAK_KEY: &str = "notes-learner-streak";

/// Every key the store writes.
pub const ALL_KEYS: [&str; 3] = [DATA_KEY, PROGRESS_KEY, STREAK_KEY];

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "NL_DATA_DIR";

/// Resolve the data directory.
///
/// Priority: explicit path > `NL_DATA_DIR` > `<data_dir>/notes-learner`.
pub fn get_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("notes-learner"))
}
