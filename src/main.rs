//! Notes Learner CLI - flashcards from markdown topic files.

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use notes_learner::Error;
use notes_learner::cli::{
    Cli, Commands, ConfigCommands, NuggetCommands, ProgressCommands, TopicCommands,
};
use notes_learner::commands::{self, CompletionFilter, Output};
use notes_learner::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use notes_learner::events::StoreEvent;
use notes_learner::storage::get_data_dir;
use notes_learner::watch;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, e.g. `NL_LOG=debug`.
const LOG_ENV: &str = "NL_LOG";

fn main() {
    let cli = Cli::parse();
    let human_flag = cli.human_readable;

    let result = run(cli);

    if let Err((e, human)) = result {
        if human || human_flag {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Resolve settings, install logging, and run the command.
///
/// Errors carry whether human output was in effect so they print in the
/// same format as a successful result would have.
fn run(cli: Cli) -> Result<(), (Error, bool)> {
    let data_dir = get_data_dir(cli.data_dir).map_err(|e| (e, false))?;

    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if let Commands::Parse { import, .. } | Commands::Import { import, .. } = &cli.command {
        if import.allow_empty {
            overrides = overrides.with_strict_import(false);
        }
    }

    let config = resolve_config(&data_dir, &overrides).map_err(|e| (e, false))?;
    let human = config.output_format() == OutputFormat::Human;
    init_logging(&config);
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");

    run_command(cli.command, &data_dir, &config, human).map_err(|e| (e, human))
}

fn init_logging(config: &ResolvedConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_command(
    command: Commands,
    data_dir: &Path,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), Error> {
    match command {
        Commands::Parse { file, .. } => {
            let result = commands::parse_file(&file, &commands::parse_options(config))?;
            output(&result, human);
        }

        Commands::Import { files, .. } => {
            let mut store = commands::open_store(data_dir, config)?;
            let result = commands::import(&mut store, &files)?;
            output(&result, human);
        }

        Commands::Restore { file } => {
            let mut store = commands::open_store(data_dir, config)?;
            let result = commands::restore(&mut store, &file)?;
            output(&result, human);
        }

        Commands::Export { output: path } => {
            let store = commands::open_store(data_dir, config)?;
            match path {
                Some(path) => output(&commands::export_to(&store, &path)?, human),
                None => output(&commands::export(&store), human),
            }
        }

        Commands::Topic { command } => match command {
            TopicCommands::List => {
                let store = commands::open_store(data_dir, config)?;
                output(&commands::topic_list(&store), human);
            }
            TopicCommands::Show { id } => {
                let store = commands::open_store(data_dir, config)?;
                output(&commands::topic_show(&store, &id)?, human);
            }
            TopicCommands::Delete { id } => {
                let mut store = commands::open_store(data_dir, config)?;
                output(&commands::topic_delete(&mut store, &id)?, human);
            }
        },

        Commands::Nugget { command } => match command {
            NuggetCommands::List {
                topic,
                completed,
                pending,
            } => {
                let store = commands::open_store(data_dir, config)?;
                let filter = CompletionFilter::from_flags(completed, pending);
                let result = commands::nugget_list(&store, topic.as_deref(), filter)?;
                output(&result, human);
            }
        },

        Commands::Progress { command } => {
            let mut store = commands::open_store(data_dir, config)?;
            match command {
                ProgressCommands::Show => output(&commands::progress_show(&store), human),
                ProgressCommands::Toggle { id } => {
                    output(&commands::progress_toggle(&mut store, &id)?, human)
                }
                ProgressCommands::Complete { id } => {
                    output(&commands::progress_complete(&mut store, &id)?, human)
                }
            }
        }

        Commands::Streak => {
            let mut store = commands::open_store(data_dir, config)?;
            output(&commands::streak(&mut store), human);
        }

        Commands::Stats { topic } => {
            let mut store = commands::open_store(data_dir, config)?;
            output(&commands::stats(&mut store, topic.as_deref())?, human);
        }

        Commands::Review { topic, seed, limit } => {
            let store = commands::open_store(data_dir, config)?;
            output(
                &commands::review(&store, topic.as_deref(), seed, limit),
                human,
            );
        }

        Commands::Reset { yes } => {
            let mut store = commands::open_store(data_dir, config)?;
            output(&commands::reset(&mut store, yes)?, human);
        }

        Commands::Watch => run_watch(data_dir, human)?,

        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(data_dir, config), human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(data_dir, &key, &value)?, human)
            }
        },
    }

    Ok(())
}

/// Print one line per changed key until Ctrl-C.
fn run_watch(data_dir: &Path, human: bool) -> Result<(), Error> {
    std::fs::create_dir_all(data_dir)?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))
        .map_err(|e| Error::Other(format!("Failed to install Ctrl-C handler: {}", e)))?;

    if human {
        eprintln!("Watching {} (Ctrl-C to stop)", data_dir.display());
    }

    watch::watch_data_dir(data_dir, &stop, |event| {
        if let StoreEvent::StorageChanged { ref key } = event {
            if human {
                println!("changed: {}", key);
            } else {
                println!("{}", serde_json::json!(event));
            }
        }
    })
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
