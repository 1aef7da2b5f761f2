//! Configuration for Notes Learner.
//!
//! Preferences live in `config.kdl` files at two levels:
//!
//! - System: `~/.config/notes-learner/config.kdl` (directory overridable
//!   with `NL_CONFIG_DIR`)
//! - Data dir: `<data-dir>/config.kdl`, next to the stored buckets
//!
//! Contains:
//! - `output-format` - "json" or "human"
//! - `strict-import` - reject documents that contain no nuggets
//! - `default-color` - color for topics that do not declare one
//! - `log-level` - log filter when `NL_LOG` is unset
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config};
pub use schema::{LearnerConfig, OutputFormat};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kdl::KdlDocument;

use crate::{Error, Result};

/// File name used at both config levels.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "NL_CONFIG_DIR";

/// Directory holding the system config, if one can be determined.
pub fn system_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("notes-learner")),
    }
}

pub fn system_config_path() -> Option<PathBuf> {
    system_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

pub fn data_dir_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Read the system config; empty when the file does not exist.
pub fn read_system_config() -> Result<LearnerConfig> {
    match system_config_path() {
        Some(path) => read_config_file(&path),
        None => Ok(LearnerConfig::default()),
    }
}

pub fn read_data_dir_config(data_dir: &Path) -> Result<LearnerConfig> {
    read_config_file(&data_dir_config_path(data_dir))
}

/// Write `config` as the data-dir config.kdl, returning its path.
pub fn write_data_dir_config(data_dir: &Path, config: &LearnerConfig) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir_config_path(data_dir);
    fs::write(&path, config.to_kdl().to_string())?;
    tracing::debug!(path = %path.display(), "wrote config");
    Ok(path)
}

/// Read and parse a config.kdl file. A missing file is an empty config.
pub fn read_config_file(path: &Path) -> Result<LearnerConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LearnerConfig::default()),
        Err(e) => return Err(e.into()),
    };

    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = LearnerConfig::from_kdl(&doc)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
