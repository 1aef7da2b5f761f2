//! Command implementations for the Notes Learner CLI.
//!
//! Each command returns a result type implementing [`Output`], which the
//! binary prints as JSON or, with `-H`, as human-readable text.
//!
//! Commands operate on a [`Store`] over any [`Bucket`]; the binary opens a
//! [`FileBucket`] in the data directory via [`open_store`].

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::{self, LearnerConfig, ResolvedConfig};
use crate::models::{Nugget, ProgressMap, Stats, Topic, is_completed};
use crate::parser::{self, ParseOptions, ParsedDocument};
use crate::storage::{Bucket, FileBucket};
use crate::store::Store;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to a JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "failed to serialize output: {}"}}"#, e))
}

/// Parse options derived from resolved config.
pub fn parse_options(config: &ResolvedConfig) -> ParseOptions {
    ParseOptions {
        require_nuggets: config.strict_import(),
        default_color: config.default_color().to_string(),
    }
}

/// Open the file-backed store in `data_dir`.
pub fn open_store(data_dir: &Path, config: &ResolvedConfig) -> Result<Store<FileBucket>> {
    let bucket = FileBucket::open(data_dir)?;
    debug!(backend = bucket.backend_type(), location = %bucket.location(), "Opened store");
    Ok(Store::new(bucket).with_parse_options(parse_options(config)))
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path)
        .map_err(|e| Error::Other(format!("Failed to read {}: {}", path.display(), e)))
}

/// A nugget with its completion state.
#[derive(Debug, Serialize)]
pub struct NuggetStatus {
    #[serde(flatten)]
    pub nugget: Nugget,
    pub completed: bool,
}

impl NuggetStatus {
    fn new(nugget: Nugget, progress: &ProgressMap) -> Self {
        let completed = is_completed(progress, &nugget.id);
        Self { nugget, completed }
    }

    fn human_line(&self) -> String {
        let mark = if self.completed { "x" } else { " " };
        format!("[{}] {}  {}", mark, self.nugget.id, self.nugget.topic)
    }
}

fn topic_heading(topic: &Topic) -> String {
    format!("{} ({}) {}", topic.name, topic.id, topic.color)
}

// === parse / import / restore / export ===

#[derive(Debug, Serialize)]
pub struct ParseResult {
    #[serde(flatten)]
    pub document: ParsedDocument,
}

impl Output for ParseResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{}: {} nugget(s)",
            topic_heading(&self.document.topic),
            self.document.nuggets.len()
        )];
        for nugget in &self.document.nuggets {
            lines.push(format!("  {}  {}", nugget.id, nugget.topic));
            lines.push(format!("      {}", nugget.description));
        }
        lines.join("\n")
    }
}

/// Parse a document without touching storage.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<ParseResult> {
    let text = read_input(path)?;
    let document = parser::parse_with(&text, options)?;
    Ok(ParseResult { document })
}

#[derive(Debug, Serialize)]
pub struct ImportedTopic {
    pub id: String,
    pub name: String,
    pub nuggets: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: Vec<ImportedTopic>,
    pub topics: usize,
    pub nuggets: usize,
}

impl Output for ImportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .imported
            .iter()
            .map(|t| format!("Imported {} ({}): {} nugget(s)", t.name, t.id, t.nuggets))
            .collect();
        lines.push(format!(
            "Library now holds {} topic(s), {} nugget(s)",
            self.topics, self.nuggets
        ));
        lines.join("\n")
    }
}

/// Import each file in order. Stops at the first file that fails; earlier
/// files stay imported.
pub fn import<B: Bucket>(store: &mut Store<B>, files: &[PathBuf]) -> Result<ImportResult> {
    let mut imported = Vec::with_capacity(files.len());
    for path in files {
        let text = read_input(path)?;
        let collection = store
            .import_document(&text)
            .map_err(|e| Error::Other(format!("{}: {}", path.display(), e)))?;
        // The imported topic is always appended last
        if let Some(topic) = collection.topics.last() {
            imported.push(ImportedTopic {
                id: topic.id.clone(),
                name: topic.name.clone(),
                nuggets: collection.nuggets_for(&topic.id).count(),
            });
        }
    }

    let collection = store.all_data();
    Ok(ImportResult {
        imported,
        topics: collection.topics.len(),
        nuggets: collection.nuggets.len(),
    })
}

#[derive(Debug, Serialize)]
pub struct RestoreResult {
    pub topics: usize,
    pub nuggets: usize,
}

impl Output for RestoreResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Restored. Library now holds {} topic(s), {} nugget(s)",
            self.topics, self.nuggets
        )
    }
}

pub fn restore<B: Bucket>(store: &mut Store<B>, path: &Path) -> Result<RestoreResult> {
    let text = read_input(path)?;
    let collection = store.restore(&text)?;
    Ok(RestoreResult {
        topics: collection.topics.len(),
        nuggets: collection.nuggets.len(),
    })
}

/// Export printed to stdout. The export itself is the output in both modes.
#[derive(Debug)]
pub struct ExportResult {
    pub exported: String,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        self.exported.clone()
    }

    fn to_human(&self) -> String {
        self.exported.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct ExportWritten {
    pub path: PathBuf,
    pub bytes: usize,
}

impl Output for ExportWritten {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Exported {} bytes to {}", self.bytes, self.path.display())
    }
}

pub fn export<B: Bucket>(store: &Store<B>) -> ExportResult {
    ExportResult {
        exported: store.export_all(),
    }
}

pub fn export_to<B: Bucket>(store: &Store<B>, path: &Path) -> Result<ExportWritten> {
    let exported = store.export_all();
    fs::write(path, &exported)?;
    Ok(ExportWritten {
        path: path.to_path_buf(),
        bytes: exported.len(),
    })
}

// === topics ===

#[derive(Debug, Serialize)]
pub struct TopicSummary {
    #[serde(flatten)]
    pub topic: Topic,
    pub nuggets: usize,
    pub completed: usize,
}

#[derive(Debug, Serialize)]
pub struct TopicListResult {
    pub topics: Vec<TopicSummary>,
    pub count: usize,
}

impl Output for TopicListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.topics.is_empty() {
            return "No topics. Import one with `nl import <FILE>`.".to_string();
        }
        let mut lines = vec![format!("{} topic(s):", self.count)];
        for summary in &self.topics {
            lines.push(format!(
                "  {}  {}/{} done",
                topic_heading(&summary.topic),
                summary.completed,
                summary.nuggets
            ));
        }
        lines.join("\n")
    }
}

pub fn topic_list<B: Bucket>(store: &Store<B>) -> TopicListResult {
    let collection = store.all_data();
    let progress = store.progress();
    let topics: Vec<TopicSummary> = collection
        .topics
        .iter()
        .map(|topic| {
            let nuggets: Vec<&Nugget> = collection.nuggets_for(&topic.id).collect();
            TopicSummary {
                topic: topic.clone(),
                nuggets: nuggets.len(),
                completed: nuggets
                    .iter()
                    .filter(|n| is_completed(&progress, &n.id))
                    .count(),
            }
        })
        .collect();
    TopicListResult {
        count: topics.len(),
        topics,
    }
}

#[derive(Debug, Serialize)]
pub struct TopicShowResult {
    pub topic: Topic,
    pub nuggets: Vec<NuggetStatus>,
}

impl Output for TopicShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![topic_heading(&self.topic)];
        if let Some(ref description) = self.topic.description {
            lines.push(format!("  {}", description));
        }
        lines.extend(self.nuggets.iter().map(|n| format!("  {}", n.human_line())));
        lines.join("\n")
    }
}

pub fn topic_show<B: Bucket>(store: &Store<B>, id: &str) -> Result<TopicShowResult> {
    let topic = store
        .topic(id)
        .ok_or_else(|| Error::NotFound(format!("Topic not found: {}", id)))?;
    let progress = store.progress();
    let nuggets = store
        .nuggets_for(id)
        .into_iter()
        .map(|n| NuggetStatus::new(n, &progress))
        .collect();
    Ok(TopicShowResult { topic, nuggets })
}

#[derive(Debug, Serialize)]
pub struct TopicDeleted {
    pub id: String,
    pub deleted: bool,
}

impl Output for TopicDeleted {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Deleted topic {}", self.id)
    }
}

pub fn topic_delete<B: Bucket>(store: &mut Store<B>, id: &str) -> Result<TopicDeleted> {
    if !store.delete_topic(id) {
        return Err(Error::NotFound(format!("Topic not found: {}", id)));
    }
    Ok(TopicDeleted {
        id: id.to_string(),
        deleted: true,
    })
}

// === nuggets ===

/// Which nuggets `nugget list` shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl CompletionFilter {
    pub fn from_flags(completed: bool, pending: bool) -> Self {
        match (completed, pending) {
            (true, _) => CompletionFilter::Completed,
            (_, true) => CompletionFilter::Pending,
            _ => CompletionFilter::All,
        }
    }

    fn accepts(&self, completed: bool) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Completed => completed,
            CompletionFilter::Pending => !completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NuggetListResult {
    pub nuggets: Vec<NuggetStatus>,
    pub count: usize,
}

impl Output for NuggetListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.nuggets.is_empty() {
            return "No nuggets.".to_string();
        }
        let mut lines = vec![format!("{} nugget(s):", self.count)];
        lines.extend(self.nuggets.iter().map(|n| format!("  {}", n.human_line())));
        lines.join("\n")
    }
}

pub fn nugget_list<B: Bucket>(
    store: &Store<B>,
    topic: Option<&str>,
    filter: CompletionFilter,
) -> Result<NuggetListResult> {
    let collection = store.all_data();
    if let Some(id) = topic {
        if collection.topic(id).is_none() {
            return Err(Error::NotFound(format!("Topic not found: {}", id)));
        }
    }

    let progress = store.progress();
    let nuggets: Vec<NuggetStatus> = collection
        .nuggets
        .into_iter()
        .filter(|n| topic.is_none_or(|id| n.topic_id == id))
        .map(|n| NuggetStatus::new(n, &progress))
        .filter(|s| filter.accepts(s.completed))
        .collect();
    Ok(NuggetListResult {
        count: nuggets.len(),
        nuggets,
    })
}

// === progress ===

#[derive(Debug, Serialize)]
pub struct ProgressShowResult {
    pub progress: ProgressMap,
    pub completed: usize,
}

impl Output for ProgressShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.completed == 0 {
            return "No nuggets completed yet.".to_string();
        }
        let mut lines = vec![format!("{} nugget(s) completed:", self.completed)];
        for (id, entry) in self.progress.iter().filter(|(_, e)| e.completed) {
            lines.push(format!(
                "  {}  {}",
                id,
                entry.last_reviewed.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        lines.join("\n")
    }
}

pub fn progress_show<B: Bucket>(store: &Store<B>) -> ProgressShowResult {
    let progress = store.progress();
    ProgressShowResult {
        completed: progress.values().filter(|e| e.completed).count(),
        progress,
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionResult {
    pub id: String,
    pub completed: bool,
    pub changed: bool,
    pub streak: u32,
}

impl Output for CompletionResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let state = if self.completed {
            "completed"
        } else {
            "not completed"
        };
        let prefix = if self.changed { "" } else { "Already " };
        format!(
            "{}{}: {} (streak: {} day(s))",
            prefix, self.id, state, self.streak
        )
    }
}

fn require_nugget<B: Bucket>(store: &Store<B>, id: &str) -> Result<()> {
    if store.all_data().nugget(id).is_none() {
        return Err(Error::NotFound(format!("Nugget not found: {}", id)));
    }
    Ok(())
}

pub fn progress_toggle<B: Bucket>(store: &mut Store<B>, id: &str) -> Result<CompletionResult> {
    require_nugget(store, id)?;
    let completed = store.toggle_completion(id);
    Ok(CompletionResult {
        id: id.to_string(),
        completed,
        changed: true,
        streak: store.cached_streak(),
    })
}

pub fn progress_complete<B: Bucket>(store: &mut Store<B>, id: &str) -> Result<CompletionResult> {
    require_nugget(store, id)?;
    let changed = store.mark_completed(id);
    Ok(CompletionResult {
        id: id.to_string(),
        completed: true,
        changed,
        streak: store.current_streak(),
    })
}

// === streak / stats / review ===

#[derive(Debug, Serialize)]
pub struct StreakResult {
    pub streak: u32,
}

impl Output for StreakResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.streak {
            0 => "No streak yet. Complete a nugget today to start one.".to_string(),
            1 => "1 day streak".to_string(),
            n => format!("{} day streak", n),
        }
    }
}

pub fn streak<B: Bucket>(store: &mut Store<B>) -> StreakResult {
    StreakResult {
        streak: store.current_streak(),
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub stats: Stats,
}

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let scope = match self.topic {
            Some(ref id) => format!("Topic {}", id),
            None => "All topics".to_string(),
        };
        format!(
            "{}: {}/{} completed ({}%), streak {} day(s)",
            scope,
            self.stats.completed,
            self.stats.total,
            self.stats.completion_rate,
            self.stats.streak
        )
    }
}

pub fn stats<B: Bucket>(store: &mut Store<B>, topic: Option<&str>) -> Result<StatsResult> {
    if let Some(id) = topic {
        if store.topic(id).is_none() {
            return Err(Error::NotFound(format!("Topic not found: {}", id)));
        }
    }
    Ok(StatsResult {
        topic: topic.map(str::to_string),
        stats: store.stats(topic),
    })
}

#[derive(Debug, Serialize)]
pub struct ReviewResult {
    pub deck: Vec<Nugget>,
    pub count: usize,
}

impl Output for ReviewResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.deck.is_empty() {
            return "Nothing to review. Complete some nuggets first.".to_string();
        }
        let mut lines = Vec::new();
        for (i, nugget) in self.deck.iter().enumerate() {
            lines.push(format!("{}. [{}] {}", i + 1, nugget.topic_id, nugget.topic));
            lines.push(format!("   {}", nugget.description));
        }
        lines.join("\n")
    }
}

pub fn review<B: Bucket>(
    store: &Store<B>,
    topic: Option<&str>,
    seed: Option<u64>,
    limit: Option<usize>,
) -> ReviewResult {
    let mut deck = store.review_deck(topic, seed);
    if let Some(limit) = limit {
        deck.truncate(limit);
    }
    ReviewResult {
        count: deck.len(),
        deck,
    }
}

// === reset ===

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub reset: bool,
    pub backend: &'static str,
    pub location: String,
}

impl Output for ResetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Removed all topics, nuggets, and progress from {} ({})",
            self.location, self.backend
        )
    }
}

pub fn reset<B: Bucket>(store: &mut Store<B>, confirmed: bool) -> Result<ResetResult> {
    if !confirmed {
        return Err(Error::Other(
            "Refusing to delete all data without --yes".to_string(),
        ));
    }
    store.reset();
    Ok(ResetResult {
        reset: true,
        backend: store.bucket().backend_type(),
        location: store.bucket().location(),
    })
}

// === config ===

#[derive(Debug, Serialize)]
pub struct SettingView {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub data_dir: PathBuf,
    pub system_config: Option<PathBuf>,
    pub data_dir_config: PathBuf,
    pub settings: Vec<SettingView>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Data directory: {}", self.data_dir.display())];
        match self.system_config {
            Some(ref path) => lines.push(format!("System config: {}", path.display())),
            None => lines.push("System config: (unavailable)".to_string()),
        }
        lines.push(format!(
            "Data-dir config: {}",
            self.data_dir_config.display()
        ));
        lines.push(String::new());
        for setting in &self.settings {
            lines.push(format!(
                "  {} = {}  [{}]",
                setting.key, setting.value, setting.source
            ));
        }
        lines.join("\n")
    }
}

pub fn config_show(data_dir: &Path, config: &ResolvedConfig) -> ConfigShowResult {
    let settings = vec![
        SettingView {
            key: "output-format",
            value: config.output_format().to_string(),
            source: config.output_format.source.to_string(),
        },
        SettingView {
            key: "strict-import",
            value: config.strict_import().to_string(),
            source: config.strict_import.source.to_string(),
        },
        SettingView {
            key: "default-color",
            value: config.default_color().to_string(),
            source: config.default_color.source.to_string(),
        },
        SettingView {
            key: "log-level",
            value: config.log_level().to_string(),
            source: config.log_level.source.to_string(),
        },
    ];
    ConfigShowResult {
        data_dir: data_dir.to_path_buf(),
        system_config: config::system_config_path(),
        data_dir_config: config::data_dir_config_path(data_dir),
        settings,
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: PathBuf,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path.display())
    }
}

/// Store one setting in the data-dir config.kdl, keeping the others.
pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut update = LearnerConfig::new();
    update.set(key, value).map_err(Error::Config)?;

    let mut current = config::read_data_dir_config(data_dir)?;
    current.merge(&update);
    let path = config::write_data_dir_config(data_dir, &current)?;

    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path,
    })
}
