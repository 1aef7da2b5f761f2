//! Persistence store for topics, nuggets, and progress.
//!
//! The store reads and writes three keys of a [`Bucket`] and merges parsed
//! documents into the stored collection. Storage failures never reach the
//! caller: reads degrade to empty values and failed writes are logged while
//! the computed value is still returned. The only caller-visible errors are
//! [`FormatError`]s from importing a document or an export.
//!
//! Every write is followed by notifications to subscribed observers: a
//! domain event (`DataChanged` or `CompletionChanged`) and a
//! `StorageChanged` event naming the written key.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::events::{Observers, StoreEvent, SubscriptionId};
use crate::models::{Collection, Nugget, ProgressEntry, ProgressMap, Stats, Topic, is_completed};
use crate::parser::{self, FormatError, ParseOptions};
use crate::storage::{ALL_KEYS, Bucket, DATA_KEY, PROGRESS_KEY, STREAK_KEY};

/// Count consecutive days ending at `today` with at least one completion.
///
/// Review timestamps are converted to `offset` before taking their date.
pub fn compute_streak(progress: &ProgressMap, today: NaiveDate, offset: &FixedOffset) -> u32 {
    let days: BTreeSet<NaiveDate> = progress
        .values()
        .filter(|entry| entry.completed)
        .map(|entry| entry.last_reviewed.with_timezone(offset).date_naive())
        .collect();

    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Store over a bucket `B`.
pub struct Store<B: Bucket> {
    bucket: B,
    clock: Box<dyn Clock>,
    options: ParseOptions,
    observers: Observers,
}

impl<B: Bucket> Store<B> {
    /// Create a store using the system clock and default parse options.
    pub fn new(bucket: B) -> Self {
        Self {
            bucket,
            clock: Box::new(SystemClock),
            options: ParseOptions::default(),
            observers: Observers::new(),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the options used when parsing imported documents.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying bucket.
    pub fn bucket(&self) -> &B {
        &self.bucket
    }

    /// Register a listener for store events.
    pub fn subscribe(&mut self, listener: impl Fn(&StoreEvent) + 'static) -> SubscriptionId {
        let id = self.observers.subscribe(listener);
        debug!(listeners = self.observers.len(), "Subscribed to store events");
        id
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // === Collection ===

    /// Read the stored collection.
    ///
    /// Never fails: an absent or unreadable value is an empty collection,
    /// a non-array `topics`/`nuggets` field is empty, and entries that do
    /// not deserialize are skipped.
    pub fn all_data(&self) -> Collection {
        let Some(value) = self.read_json(DATA_KEY) else {
            return Collection::new();
        };

        Collection {
            topics: coerce_array::<Topic>(&value, "topics"),
            nuggets: coerce_array::<Nugget>(&value, "nuggets"),
        }
    }

    /// Look up one topic.
    pub fn topic(&self, id: &str) -> Option<Topic> {
        self.all_data().topic(id).cloned()
    }

    /// Nuggets of one topic, in stored order.
    pub fn nuggets_for(&self, topic_id: &str) -> Vec<Nugget> {
        self.all_data().nuggets_for(topic_id).cloned().collect()
    }

    /// Parse `text` and merge it into the collection.
    ///
    /// A topic with the same ID is replaced along with all of its nuggets.
    /// Nothing is written if the document is rejected.
    pub fn import_document(&mut self, text: &str) -> Result<Collection, FormatError> {
        let parsed = parser::parse_with(text, &self.options)?;
        let topic_id = parsed.topic.id.clone();
        let count = parsed.nuggets.len();

        let mut collection = self.all_data();
        collection.replace_topic(parsed.topic, parsed.nuggets);
        self.write_collection(&collection);

        info!(topic = %topic_id, nuggets = count, "Imported topic");
        Ok(collection)
    }

    /// Re-import a collection produced by [`Store::export_all`].
    ///
    /// Each exported topic replaces the stored topic of the same ID. Nuggets
    /// whose topic is not part of the export are ignored.
    pub fn restore(&mut self, exported: &str) -> Result<Collection, FormatError> {
        let incoming: Collection = serde_json::from_str(exported)
            .map_err(|e| FormatError::InvalidExport(e.to_string()))?;

        let mut collection = self.all_data();
        for topic in &incoming.topics {
            let nuggets = incoming.nuggets_for(&topic.id).cloned().collect();
            collection.replace_topic(topic.clone(), nuggets);
        }
        self.write_collection(&collection);

        info!(topics = incoming.topics.len(), "Restored export");
        Ok(collection)
    }

    /// Delete a topic and its nuggets.
    ///
    /// Returns `false` (and writes nothing) if the topic does not exist.
    pub fn delete_topic(&mut self, topic_id: &str) -> bool {
        let mut collection = self.all_data();
        if !collection.remove_topic(topic_id) {
            debug!(topic = %topic_id, "Delete of unknown topic ignored");
            return false;
        }

        self.write_collection(&collection);
        info!(topic = %topic_id, "Deleted topic");
        true
    }

    /// Serialize the collection as pretty-printed JSON.
    pub fn export_all(&self) -> String {
        let collection = self.all_data();
        serde_json::to_string_pretty(&collection).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize collection for export");
            "{\n  \"topics\": [],\n  \"nuggets\": []\n}".to_string()
        })
    }

    /// Remove every key the store owns.
    pub fn reset(&mut self) {
        for key in ALL_KEYS {
            match self.bucket.remove_item(key) {
                Ok(()) => self.observers.emit(&StoreEvent::StorageChanged {
                    key: key.to_string(),
                }),
                Err(e) => error!(key, error = %e, "Failed to remove key"),
            }
        }
        self.observers.emit(&StoreEvent::DataChanged {
            collection: Collection::new(),
        });
        info!("Reset all data");
    }

    // === Progress ===

    /// Read completion state, empty if absent or unreadable.
    ///
    /// Entries that do not deserialize are skipped so the rest survive the
    /// next write.
    pub fn progress(&self) -> ProgressMap {
        let Some(Value::Object(entries)) = self.read_json(PROGRESS_KEY) else {
            return ProgressMap::new();
        };

        entries
            .into_iter()
            .filter_map(|(id, entry)| match serde_json::from_value(entry) {
                Ok(parsed) => Some((id, parsed)),
                Err(e) => {
                    warn!(key = PROGRESS_KEY, nugget = %id, error = %e, "Skipping malformed progress entry");
                    None
                }
            })
            .collect()
    }

    /// Flip the completion state of a nugget and return the new state.
    ///
    /// Completing records the current time; un-completing removes the
    /// entry entirely.
    pub fn toggle_completion(&mut self, nugget_id: &str) -> bool {
        let mut progress = self.progress();
        let completed = if is_completed(&progress, nugget_id) {
            progress.remove(nugget_id);
            false
        } else {
            progress.insert(nugget_id.to_string(), self.completed_now());
            true
        };

        self.write_progress(nugget_id, progress);
        completed
    }

    /// Mark a nugget completed unless it already is.
    ///
    /// Returns `true` if the state changed.
    pub fn mark_completed(&mut self, nugget_id: &str) -> bool {
        let mut progress = self.progress();
        if is_completed(&progress, nugget_id) {
            return false;
        }

        progress.insert(nugget_id.to_string(), self.completed_now());
        self.write_progress(nugget_id, progress);
        true
    }

    /// Compute the streak and cache it in the bucket.
    pub fn current_streak(&mut self) -> u32 {
        let streak = self.streak_for(&self.progress());
        self.write_item(STREAK_KEY, &streak.to_string());
        streak
    }

    /// The last cached streak, without recomputing.
    pub fn cached_streak(&self) -> u32 {
        match self.read_item(STREAK_KEY) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key = STREAK_KEY, value = %raw, "Malformed streak, using 0");
                0
            }),
            None => 0,
        }
    }

    /// Completion statistics, optionally limited to one topic.
    pub fn stats(&mut self, topic_id: Option<&str>) -> Stats {
        let collection = self.all_data();
        let progress = self.progress();
        let streak = self.current_streak();
        let nuggets = collection
            .nuggets
            .iter()
            .filter(|n| topic_id.is_none_or(|id| n.topic_id == id));
        Stats::compute(nuggets, &progress, streak)
    }

    /// Nuggets with a progress entry, shuffled.
    ///
    /// A `seed` makes the order reproducible.
    pub fn review_deck(&self, topic_id: Option<&str>, seed: Option<u64>) -> Vec<Nugget> {
        let progress = self.progress();
        let mut deck: Vec<Nugget> = self
            .all_data()
            .nuggets
            .into_iter()
            .filter(|n| progress.contains_key(&n.id))
            .filter(|n| topic_id.is_none_or(|id| n.topic_id == id))
            .collect();

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        deck.shuffle(&mut rng);
        deck
    }

    // === Internals ===

    fn completed_now(&self) -> ProgressEntry {
        ProgressEntry::completed_at(self.clock.now().with_timezone(&Utc))
    }

    fn streak_for(&self, progress: &ProgressMap) -> u32 {
        let now: DateTime<FixedOffset> = self.clock.now();
        compute_streak(progress, self.clock.today(), now.offset())
    }

    fn write_collection(&mut self, collection: &Collection) {
        match serde_json::to_string(collection) {
            Ok(json) => self.write_item(DATA_KEY, &json),
            Err(e) => error!(key = DATA_KEY, error = %e, "Failed to serialize collection"),
        }
        self.observers.emit(&StoreEvent::DataChanged {
            collection: collection.clone(),
        });
    }

    fn write_progress(&mut self, nugget_id: &str, progress: ProgressMap) {
        match serde_json::to_string(&progress) {
            Ok(json) => self.write_item(PROGRESS_KEY, &json),
            Err(e) => error!(key = PROGRESS_KEY, error = %e, "Failed to serialize progress"),
        }

        let streak = self.streak_for(&progress);
        self.write_item(STREAK_KEY, &streak.to_string());
        debug!(nugget = %nugget_id, streak, "Completion changed");
        self.observers.emit(&StoreEvent::CompletionChanged {
            nugget_id: nugget_id.to_string(),
            progress,
            streak,
        });
    }

    /// Write one key and signal the change. Failures are logged only.
    fn write_item(&mut self, key: &str, value: &str) {
        match self.bucket.set_item(key, value) {
            Ok(()) => {
                debug!(key, bytes = value.len(), "Wrote key");
                self.observers.emit(&StoreEvent::StorageChanged {
                    key: key.to_string(),
                });
            }
            Err(e) => error!(key, error = %e, "Failed to write key"),
        }
    }

    fn read_item(&self, key: &str) -> Option<String> {
        match self.bucket.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read key");
                None
            }
        }
    }

    fn read_json(&self, key: &str) -> Option<Value> {
        let raw = self.read_item(key)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => {
                warn!(key, "Stored value is not an object, ignoring");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Stored value is not valid JSON, ignoring");
                None
            }
        }
    }
}

/// Deserialize `value[field]` element by element, dropping bad entries.
fn coerce_array<T: DeserializeOwned>(value: &Value, field: &str) -> Vec<T> {
    let Some(items) = value.get(field).and_then(Value::as_array) else {
        if value.get(field).is_some() {
            warn!(field, "Stored field is not an array, using empty");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(field, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect()
}
