//! Data models for Notes Learner entities.
//!
//! This module defines the core data structures:
//! - `Topic` - A named, colored grouping of nuggets sourced from one document
//! - `Nugget` - A single question/answer flashcard
//! - `Collection` - All topics and nuggets, as persisted and exported
//! - `ProgressEntry` - Completion state of one nugget
//! - `Stats` - Derived learning statistics
//!
//! Field names serialize in camelCase (`topicId`, `lastReviewed`) so that
//! stored values and exports stay interchangeable with the browser app.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Color assigned to topics whose frontmatter has none.
pub const DEFAULT_TOPIC_COLOR: &str = "#4A90E2";

/// A named grouping of nuggets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier (e.g., "js-basics")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Hex color code
    #[serde(default = "default_color")]
    pub color: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_color() -> String {
    DEFAULT_TOPIC_COLOR.to_string()
}

impl Topic {
    /// Create a topic with the default color and no description.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_color(),
            description: None,
        }
    }
}

/// A single question/answer flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nugget {
    /// `{topic_id}-{ordinal}`
    pub id: String,

    /// The question (called `topic` in the stored format)
    pub topic: String,

    /// The answer
    pub description: String,

    /// Owning topic
    pub topic_id: String,
}

impl Nugget {
    /// Build the nugget at `ordinal` within the document for `topic_id`.
    pub fn new(
        topic_id: &str,
        ordinal: usize,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{}-{}", topic_id, ordinal),
            topic: question.into(),
            description: answer.into(),
            topic_id: topic_id.to_string(),
        }
    }
}

/// Every topic and nugget known to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub topics: Vec<Topic>,

    #[serde(default)]
    pub nuggets: Vec<Nugget>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the collection holds no topics and no nuggets.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.nuggets.is_empty()
    }

    /// Look up a topic by ID.
    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Look up a nugget by ID.
    pub fn nugget(&self, id: &str) -> Option<&Nugget> {
        self.nuggets.iter().find(|n| n.id == id)
    }

    /// Nuggets belonging to `topic_id`, in stored order.
    pub fn nuggets_for<'a>(&'a self, topic_id: &'a str) -> impl Iterator<Item = &'a Nugget> {
        self.nuggets.iter().filter(move |n| n.topic_id == topic_id)
    }

    /// Remove a topic and all of its nuggets.
    ///
    /// Returns `true` if the topic existed.
    pub fn remove_topic(&mut self, topic_id: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t.id != topic_id);
        self.nuggets.retain(|n| n.topic_id != topic_id);
        self.topics.len() != before
    }

    /// Replace any topic with the same ID (and its nuggets) by `topic` and
    /// `nuggets`, appending them at the end.
    pub fn replace_topic(&mut self, topic: Topic, nuggets: Vec<Nugget>) {
        self.remove_topic(&topic.id);
        self.topics.push(topic);
        self.nuggets.extend(nuggets);
    }
}

/// Completion state of one nugget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub completed: bool,

    /// When the nugget was last marked completed
    #[serde(serialize_with = "serialize_iso_millis")]
    pub last_reviewed: DateTime<Utc>,
}

impl ProgressEntry {
    /// A completed entry reviewed at `at`.
    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            last_reviewed: at,
        }
    }
}

/// Serialize timestamps the way `Date.prototype.toISOString` does.
fn serialize_iso_millis<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Progress keyed by nugget ID.
pub type ProgressMap = BTreeMap<String, ProgressEntry>;

/// Whether `nugget_id` is marked completed in `progress`.
pub fn is_completed(progress: &ProgressMap, nugget_id: &str) -> bool {
    progress.get(nugget_id).is_some_and(|e| e.completed)
}

/// Learning statistics over a set of nuggets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Consecutive days with at least one completion, ending today
    pub streak: u32,
    /// Nuggets in scope that are completed
    pub completed: usize,
    /// Nuggets in scope
    pub total: usize,
    /// `completed / total` as a rounded percentage
    pub completion_rate: u32,
}

impl Stats {
    /// Compute stats for `nuggets` against `progress`.
    pub fn compute<'a>(
        nuggets: impl IntoIterator<Item = &'a Nugget>,
        progress: &ProgressMap,
        streak: u32,
    ) -> Self {
        let mut total = 0;
        let mut completed = 0;
        for nugget in nuggets {
            total += 1;
            if is_completed(progress, &nugget.id) {
                completed += 1;
            }
        }

        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            streak,
            completed,
            total,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Collection {
        Collection {
            topics: vec![Topic::new("js", "JS"), Topic::new("rust", "Rust")],
            nuggets: vec![
                Nugget::new("js", 0, "Q0", "A0"),
                Nugget::new("js", 1, "Q1", "A1"),
                Nugget::new("rust", 0, "Q", "A"),
            ],
        }
    }

    #[test]
    fn test_nugget_serializes_camel_case() {
        let nugget = Nugget::new("js", 0, "What is a closure?", "A function.");
        let json = serde_json::to_value(&nugget).unwrap();
        assert_eq!(json["id"], "js-0");
        assert_eq!(json["topicId"], "js");
        assert_eq!(json["topic"], "What is a closure?");
        assert!(json.get("topic_id").is_none());
    }

    #[test]
    fn test_topic_description_omitted_when_absent() {
        let json = serde_json::to_string(&Topic::new("js", "JS")).unwrap();
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_topic_missing_color_gets_default() {
        let topic: Topic = serde_json::from_str(r#"{"id":"js","name":"JS"}"#).unwrap();
        assert_eq!(topic.color, DEFAULT_TOPIC_COLOR);
    }

    #[test]
    fn test_progress_entry_timestamp_format() {
        let at = "2026-10-15T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let json = serde_json::to_string(&ProgressEntry::completed_at(at)).unwrap();
        assert_eq!(
            json,
            r#"{"completed":true,"lastReviewed":"2026-10-15T09:30:00.000Z"}"#
        );
    }

    #[test]
    fn test_progress_entry_reads_browser_timestamps() {
        let json = r#"{"completed":true,"lastReviewed":"2026-10-15T09:30:12.345Z"}"#;
        let entry: ProgressEntry = serde_json::from_str(json).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.last_reviewed.timestamp_subsec_millis(), 345);
    }

    #[test]
    fn test_remove_topic_purges_its_nuggets_only() {
        let mut collection = sample();
        assert!(collection.remove_topic("js"));
        assert_eq!(collection.topics.len(), 1);
        assert_eq!(collection.nuggets.len(), 1);
        assert_eq!(collection.nuggets[0].topic_id, "rust");
        assert!(!collection.remove_topic("js"));
    }

    #[test]
    fn test_remove_topic_does_not_match_id_prefixes() {
        let mut collection = sample();
        collection.topics.push(Topic::new("js-advanced", "JS Advanced"));
        collection
            .nuggets
            .push(Nugget::new("js-advanced", 0, "Q", "A"));

        collection.remove_topic("js");

        assert!(collection.topic("js-advanced").is_some());
        assert_eq!(collection.nuggets_for("js-advanced").count(), 1);
    }

    #[test]
    fn test_replace_topic_appends_at_end() {
        let mut collection = sample();
        collection.replace_topic(
            Topic::new("js", "JavaScript"),
            vec![Nugget::new("js", 0, "New", "Card")],
        );
        assert_eq!(collection.topics.last().unwrap().name, "JavaScript");
        assert_eq!(collection.topics.len(), 2);
        assert_eq!(collection.nuggets_for("js").count(), 1);
    }

    #[test]
    fn test_stats_rounding() {
        let collection = sample();
        let mut progress = ProgressMap::new();
        progress.insert(
            "js-0".to_string(),
            ProgressEntry::completed_at(Utc::now()),
        );
        let stats = Stats::compute(&collection.nuggets, &progress, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_stats_empty_is_zero_rate() {
        let stats = Stats::compute(std::iter::empty(), &ProgressMap::new(), 0);
        assert_eq!(stats, Stats::default());
    }
}
