//! File system watcher for the data directory.
//!
//! Turns changes made by other processes into `StorageChanged` events so a
//! running session can refresh, the way browser tabs learn about each
//! other's `localStorage` writes.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::events::StoreEvent;
use crate::storage::ALL_KEYS;
use crate::{Error, Result};

/// Debounce duration - wait this long after the last event before reporting
const DEBOUNCE_MS: u64 = 100;

/// How often the stop flag is checked while idle
const POLL_MS: u64 = 250;

/// Store key named by `path`, if it is one of ours.
pub fn key_for_path(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    ALL_KEYS.iter().copied().find(|key| *key == name)
}

/// Watch `root` until `stop` is set, calling `on_event` once per changed key
/// after each burst of file system activity settles.
pub fn watch_data_dir(
    root: &Path,
    stop: &AtomicBool,
    mut on_event: impl FnMut(StoreEvent),
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => warn!(error = %e, "Watcher error"),
        },
        Config::default(),
    )
    .map_err(|e| Error::Storage(format!("Failed to start watcher: {}", e)))?;

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|e| Error::Storage(format!("Failed to watch {}: {}", root.display(), e)))?;
    debug!(path = %root.display(), "Watching data directory");

    let debounce = Duration::from_millis(DEBOUNCE_MS);
    let mut pending: BTreeSet<&'static str> = BTreeSet::new();
    let mut last_event_time = Instant::now();

    while !stop.load(Ordering::SeqCst) {
        let timeout = if pending.is_empty() {
            Duration::from_millis(POLL_MS)
        } else {
            debounce.saturating_sub(last_event_time.elapsed())
        };

        match rx.recv_timeout(timeout) {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    let mut matched = false;
                    for key in event.paths.iter().filter_map(|p| key_for_path(p)) {
                        pending.insert(key);
                        matched = true;
                    }
                    if matched {
                        last_event_time = Instant::now();
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !pending.is_empty() && last_event_time.elapsed() >= debounce {
                    for key in std::mem::take(&mut pending) {
                        on_event(StoreEvent::StorageChanged {
                            key: key.to_string(),
                        });
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
