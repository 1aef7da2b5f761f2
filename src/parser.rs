//! Topic document parsing.
//!
//! A topic document is markdown with YAML front matter followed by
//! question/answer pairs:
//!
//! ```text
//! ---
//! name: "JavaScript"
//! id: "js-basics"
//! color: "#F7DF1E"
//! ---
//!
//! T: What is a closure?
//! D: A function that has access to its outer scope.
//! ```
//!
//! Parsing is a pure function of the input text.

use serde::Serialize;
use serde_yaml_ng::Value;

use crate::models::{DEFAULT_TOPIC_COLOR, Nugget, Topic};

/// Errors for documents that cannot become a topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("missing frontmatter")]
    MissingFrontmatter,

    #[error("invalid frontmatter: {0}")]
    InvalidFrontmatter(String),

    #[error("missing name")]
    MissingName,

    #[error("no nuggets found")]
    NoNuggets,

    #[error("invalid export: {0}")]
    InvalidExport(String),
}

/// Knobs for [`parse_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail with [`FormatError::NoNuggets`] when the body has no complete pair
    pub require_nuggets: bool,
    /// Color for topics whose front matter has none
    pub default_color: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            require_nuggets: true,
            default_color: DEFAULT_TOPIC_COLOR.to_string(),
        }
    }
}

/// A topic and the nuggets parsed from its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub topic: Topic,
    pub nuggets: Vec<Nugget>,
}

const DELIMITER: &str = "---";
const TITLE_PREFIX: &str = "T:";
const DESCRIPTION_PREFIX: &str = "D:";

/// Parse a document with default options.
pub fn parse(document: &str) -> Result<ParsedDocument, FormatError> {
    parse_with(document, &ParseOptions::default())
}

/// Parse a document into a topic and its nuggets.
pub fn parse_with(document: &str, options: &ParseOptions) -> Result<ParsedDocument, FormatError> {
    let (front_matter, body) = split_front_matter(document)?;
    let fields = parse_front_matter(front_matter)?;

    let name = fields
        .get("name")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingName)?
        .to_string();

    let id = fields
        .get("id")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&name));

    let color = fields
        .get("color")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| options.default_color.clone());

    let description = fields
        .get("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let nuggets = parse_nuggets(&id, body);
    if nuggets.is_empty() && options.require_nuggets {
        return Err(FormatError::NoNuggets);
    }

    Ok(ParsedDocument {
        topic: Topic {
            id,
            name,
            color,
            description,
        },
        nuggets,
    })
}

/// Lower-case `name` and join its whitespace-separated words with hyphens.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a document into its front matter block and body.
fn split_front_matter(document: &str) -> Result<(&str, &str), FormatError> {
    let content = document
        .strip_prefix('\u{feff}')
        .unwrap_or(document)
        .trim_start_matches(['\r', '\n', ' ', '\t']);

    let mut lines = content.split_inclusive('\n');
    let opening = lines.next().ok_or(FormatError::MissingFrontmatter)?;
    if opening.trim_end() != DELIMITER {
        return Err(FormatError::MissingFrontmatter);
    }

    let start = opening.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let front_matter = &content[start..offset];
            let body = &content[offset + line.len()..];
            return Ok((front_matter, body));
        }
        offset += line.len();
    }

    Err(FormatError::MissingFrontmatter)
}

/// Parse front matter into string fields. Non-string scalars are stringified.
fn parse_front_matter(
    front_matter: &str,
) -> Result<std::collections::HashMap<String, String>, FormatError> {
    let mut fields = std::collections::HashMap::new();
    if front_matter.trim().is_empty() {
        return Ok(fields);
    }

    let value: Value = serde_yaml_ng::from_str(front_matter)
        .map_err(|e| FormatError::InvalidFrontmatter(e.to_string()))?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(fields),
        _ => {
            return Err(FormatError::InvalidFrontmatter(
                "expected key: value pairs".to_string(),
            ));
        }
    };

    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            continue;
        };
        if let Some(value) = scalar_to_string(&value) {
            fields.insert(key, value);
        }
    }

    Ok(fields)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scan the body for `T:`/`D:` pairs.
fn parse_nuggets(topic_id: &str, body: &str) -> Vec<Nugget> {
    let mut nuggets = Vec::new();
    let mut pending: Option<String> = None;

    for line in body.lines().map(str::trim) {
        if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
            let title = title.trim();
            pending = (!title.is_empty()).then(|| title.to_string());
        } else if let Some(description) = line.strip_prefix(DESCRIPTION_PREFIX) {
            let description = description.trim();
            if description.is_empty() {
                continue;
            }
            if let Some(title) = pending.take() {
                nuggets.push(Nugget::new(topic_id, nuggets.len(), title, description));
            }
        }
    }

    nuggets
}
