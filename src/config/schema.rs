//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The `LearnerConfig` struct mirroring config.kdl
//! - Parsing from and conversion to KDL
//! - Setting single values by key
//! - Validation of the values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log levels accepted by `log-level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"   // or "json"
/// strict-import #true     // reject documents without any nuggets
/// default-color "#4A90E2"
/// log-level "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Whether a document with zero nuggets is rejected
    pub strict_import: Option<bool>,

    /// Color for topics without one
    pub default_color: Option<String>,

    /// Log filter used when `NL_LOG` is unset
    pub log_level: Option<String>,
}

impl LearnerConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref color) = self.default_color {
            if !is_hex_color(color) {
                return Err(format!(
                    "default-color must be a hex color like #4A90E2, got {}",
                    color
                ));
            }
        }
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(format!(
                    "log-level must be one of {}, got {}",
                    LOG_LEVELS.join(", "),
                    level
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Fails on values of the wrong type or an unknown output format.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        if let Some(node) = doc.get("output-format") {
            let s = get_string_arg(node).ok_or("output-format expects a string")?;
            config.output_format = Some(
                OutputFormat::parse(&s)
                    .ok_or_else(|| format!("output-format must be json or human, got {}", s))?,
            );
        }

        if let Some(node) = doc.get("strict-import") {
            config.strict_import =
                Some(get_bool_arg(node).ok_or("strict-import expects #true or #false")?);
        }

        if let Some(node) = doc.get("default-color") {
            config.default_color =
                Some(get_string_arg(node).ok_or("default-color expects a string")?);
        }

        if let Some(node) = doc.get("log-level") {
            config.log_level = Some(get_string_arg(node).ok_or("log-level expects a string")?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(strict) = self.strict_import {
            let mut node = KdlNode::new("strict-import");
            node.push(KdlEntry::new(KdlValue::Bool(strict)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref color) = self.default_color {
            let mut node = KdlNode::new("default-color");
            node.push(KdlEntry::new(KdlValue::String(color.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref level) = self.log_level {
            let mut node = KdlNode::new("log-level");
            node.push(KdlEntry::new(KdlValue::String(level.clone())));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Set one value by its config.kdl key, validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "output-format" => {
                self.output_format = Some(
                    OutputFormat::parse(value)
                        .ok_or_else(|| format!("output-format must be json or human, got {}", value))?,
                );
            }
            "strict-import" => {
                self.strict_import = Some(match value {
                    "true" | "#true" => true,
                    "false" | "#false" => false,
                    _ => return Err(format!("strict-import must be true or false, got {}", value)),
                });
            }
            "default-color" => self.default_color = Some(value.to_string()),
            "log-level" => self.log_level = Some(value.to_lowercase()),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        self.validate()
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &LearnerConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.strict_import.is_some() {
            self.strict_import = other.strict_import;
        }
        if other.default_color.is_some() {
            self.default_color = other.default_color.clone();
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level.clone();
        }
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries().first().and_then(|e| e.value().as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kdl: &str) -> Result<LearnerConfig, String> {
        let doc: KdlDocument = kdl.parse().unwrap();
        LearnerConfig::from_kdl(&doc)
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r##"
            output-format "human"
            strict-import #false
            default-color "#F7DF1E"
            log-level "debug"
            "##,
        )
        .unwrap();

        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert_eq!(config.strict_import, Some(false));
        assert_eq!(config.default_color.as_deref(), Some("#F7DF1E"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(parse("").unwrap(), LearnerConfig::new());
    }

    #[test]
    fn test_parse_ignores_unknown_nodes() {
        let config = parse("editor \"nvim\"\nstrict-import #true").unwrap();
        assert_eq!(config.strict_import, Some(true));
    }

    #[test]
    fn test_invalid_values_error() {
        assert!(parse("output-format \"yaml\"").is_err());
        assert!(parse("strict-import \"yes\"").is_err());
        assert!(parse("default-color \"blue\"").is_err());
        assert!(parse("log-level \"loud\"").is_err());
    }

    #[test]
    fn test_to_kdl_round_trip() {
        let config = LearnerConfig {
            output_format: Some(OutputFormat::Json),
            strict_import: Some(true),
            default_color: Some("#123".to_string()),
            log_level: None,
        };
        let doc = config.to_kdl();
        assert_eq!(LearnerConfig::from_kdl(&doc).unwrap(), config);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = LearnerConfig {
            output_format: Some(OutputFormat::Json),
            strict_import: Some(true),
            ..LearnerConfig::default()
        };
        base.merge(&LearnerConfig {
            strict_import: Some(false),
            ..LearnerConfig::default()
        });
        assert_eq!(base.output_format, Some(OutputFormat::Json));
        assert_eq!(base.strict_import, Some(false));
    }

    #[test]
    fn test_set_by_key() {
        let mut config = LearnerConfig::new();
        config.set("output-format", "HUMAN").unwrap();
        config.set("strict-import", "#false").unwrap();
        config.set("log-level", "Debug").unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert_eq!(config.strict_import, Some(false));
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        assert!(config.set("strict-import", "maybe").is_err());
        assert!(config.set("default-color", "red").is_err());
        assert!(config.set("theme", "dark").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#4A90E2"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("4A90E2"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
