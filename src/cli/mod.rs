//! CLI argument definitions for Notes Learner.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::storage::DATA_DIR_ENV;

/// Notes Learner - flashcards from markdown topic files.
///
/// Import topic documents with `nl import`, then work through them with
/// `nl nugget list` and `nl progress toggle`.
#[derive(Parser, Debug)]
#[command(name = "nl")]
#[command(author, version, long_version = long_version(), about = "Learn from flashcards written as markdown topic files", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding stored topics and progress.
    /// Defaults to the platform data directory (e.g. ~/.local/share/notes-learner).
    #[arg(long = "data-dir", global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit: ",
        env!("NL_GIT_COMMIT"),
        "\nbuilt: ",
        env!("NL_BUILD_TIMESTAMP")
    )
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a topic document without storing it
    Parse {
        /// Path to the document (`-` for stdin)
        file: PathBuf,

        #[command(flatten)]
        import: ImportArgs,
    },

    /// Import topic documents, replacing topics with the same ID
    Import {
        /// Paths to documents (`-` for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        import: ImportArgs,
    },

    /// Re-import a file produced by `nl export`
    Restore {
        /// Path to the exported JSON (`-` for stdin)
        file: PathBuf,
    },

    /// Export all topics and nuggets as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Topic management commands
    Topic {
        #[command(subcommand)]
        command: TopicCommands,
    },

    /// Nugget queries
    Nugget {
        #[command(subcommand)]
        command: NuggetCommands,
    },

    /// Completion tracking commands
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Show the current streak of consecutive learning days
    Streak,

    /// Show completion statistics
    Stats {
        /// Limit to one topic
        #[arg(long)]
        topic: Option<String>,
    },

    /// Shuffle reviewed nuggets into a review deck
    Review {
        /// Limit to one topic
        #[arg(long)]
        topic: Option<String>,

        /// Seed for a reproducible order
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of nuggets
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete all stored topics, nuggets, and progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Print a line for every change to the data directory until interrupted
    Watch,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Options shared by `parse` and `import`.
#[derive(Args, Debug, Clone, Copy)]
pub struct ImportArgs {
    /// Accept documents that contain no nuggets
    #[arg(long)]
    pub allow_empty: bool,
}

/// Topic subcommands
#[derive(Subcommand, Debug)]
pub enum TopicCommands {
    /// List topics with nugget counts
    List,

    /// Show a topic and its nuggets
    Show {
        /// Topic ID
        id: String,
    },

    /// Delete a topic and its nuggets
    Delete {
        /// Topic ID
        id: String,
    },
}

/// Nugget subcommands
#[derive(Subcommand, Debug)]
pub enum NuggetCommands {
    /// List nuggets with their completion state
    List {
        /// Limit to one topic
        #[arg(long)]
        topic: Option<String>,

        /// Only completed nuggets
        #[arg(long, conflicts_with = "pending")]
        completed: bool,

        /// Only nuggets not yet completed
        #[arg(long)]
        pending: bool,
    },
}

/// Progress subcommands
#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Show completion state of every reviewed nugget
    Show,

    /// Flip a nugget between completed and not completed
    Toggle {
        /// Nugget ID (e.g., js-basics-0)
        id: String,
    },

    /// Mark a nugget completed (no-op if it already is)
    Complete {
        /// Nugget ID (e.g., js-basics-0)
        id: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,

    /// Store a value in the data-dir config.kdl
    Set {
        /// Config key (output-format, strict-import, default-color, log-level)
        key: String,

        /// New value
        value: String,
    },
}
