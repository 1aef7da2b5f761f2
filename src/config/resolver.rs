//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Data-dir config.kdl (`<data-dir>/config.kdl`)
//! 3. System config.kdl (`~/.config/notes-learner/config.kdl`)
//! 4. Built-in defaults

use std::path::Path;

use crate::Result;
use crate::config::{LearnerConfig, OutputFormat, read_data_dir_config, read_system_config};
use crate::models::DEFAULT_TOPIC_COLOR;

/// Log filter used when neither `NL_LOG` nor `log-level` is set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from the data directory's config.kdl
    DataDir,
    /// Value from the system config.kdl
    System,
    /// Built-in default value
    Default,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::CliFlag => "cli",
            ValueSource::DataDir => "data-dir",
            ValueSource::System => "system",
            ValueSource::Default => "default",
        }
    }
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub strict_import: Resolved<bool>,
    pub default_color: Resolved<String>,
    pub log_level: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            strict_import: Resolved::new(true, ValueSource::Default),
            default_color: Resolved::new(DEFAULT_TOPIC_COLOR.to_string(), ValueSource::Default),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn strict_import(&self) -> bool {
        self.strict_import.value
    }

    pub fn default_color(&self) -> &str {
        &self.default_color.value
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Output format override (`-H`)
    pub output_format: Option<OutputFormat>,
    /// Strictness override (`--allow-empty` sets this to false)
    pub strict_import: Option<bool>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_strict_import(mut self, strict: bool) -> Self {
        self.strict_import = Some(strict);
        self
    }
}

/// Resolve configuration for `data_dir` with full precedence chain.
pub fn resolve_config(data_dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = read_system_config()?;
    let data = read_data_dir_config(data_dir)?;
    Ok(resolve_layers(&system, &data, overrides))
}

/// Layer already-loaded configs. Split out so precedence can be tested
/// without touching the filesystem.
pub fn resolve_layers(
    system: &LearnerConfig,
    data: &LearnerConfig,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(value) = pick(
        overrides.output_format,
        data.output_format,
        system.output_format,
    ) {
        result.output_format = value;
    }

    if let Some(value) = pick(
        overrides.strict_import,
        data.strict_import,
        system.strict_import,
    ) {
        result.strict_import = value;
    }

    if let Some(value) = pick(None, data.default_color.clone(), system.default_color.clone()) {
        result.default_color = value;
    }

    if let Some(value) = pick(
        None,
        data.log_level.as_deref().map(str::to_lowercase),
        system.log_level.as_deref().map(str::to_lowercase),
    ) {
        result.log_level = value;
    }

    result
}

fn pick<T>(cli: Option<T>, data: Option<T>, system: Option<T>) -> Option<Resolved<T>> {
    cli.map(|v| Resolved::new(v, ValueSource::CliFlag))
        .or_else(|| data.map(|v| Resolved::new(v, ValueSource::DataDir)))
        .or_else(|| system.map(|v| Resolved::new(v, ValueSource::System)))
}
