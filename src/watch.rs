//! Local filesystem change watching
//!
//! Maintains one live recursive subscription on a directory subtree and
//! delivers normalized change events to a registered consumer. The watcher
//! is purely an event source: no debounce, no batching, no upload logic.
//! Consumers decide propagation policy.

use crate::error::SyncError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Normalized filesystem mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Created,
    Modified,
    Removed,
}

/// A normalized change event for upstream propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    fn new(kind: WatchEventKind, path: PathBuf) -> Self {
        Self { kind, path }
    }
}

/// Receives normalized change events on the watcher's delivery thread.
pub trait ChangeConsumer: Send {
    fn on_change(&mut self, event: WatchEvent);
}

impl<F: FnMut(WatchEvent) + Send> ChangeConsumer for F {
    fn on_change(&mut self, event: WatchEvent) {
        self(event)
    }
}

/// Handle to one live subscription.
///
/// Dropping the handle releases the underlying watcher, which closes the
/// event channel and lets the delivery thread exit; the thread is joined
/// before drop returns.
pub struct WatchHandle {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// The subtree this subscription covers.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        // Dropping the watcher closes the channel feeding the thread.
        self.watcher.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start watching `root` recursively, delivering events to `consumer`.
pub fn watch<C: ChangeConsumer + 'static>(
    root: &Path,
    mut consumer: C,
) -> Result<WatchHandle, SyncError> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        if let Err(e) = tx.send(res) {
            error!("Error sending watch event: {}", e);
        }
    })
    .map_err(|e| SyncError::Watch(format!("failed to create watcher: {e}")))?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| SyncError::Watch(format!("failed to watch {}: {e}", root.display())))?;
    info!(root = %root.display(), "Watching directory");

    let thread = thread::spawn(move || {
        for res in rx {
            match res {
                Ok(event) => {
                    for normalized in normalize(event) {
                        consumer.on_change(normalized);
                    }
                }
                Err(e) => {
                    // Keep watching despite backend errors.
                    warn!("Watch error: {}", e);
                }
            }
        }
    });

    Ok(WatchHandle {
        root: root.to_path_buf(),
        watcher: Some(watcher),
        thread: Some(thread),
    })
}

/// Flatten a backend event into normalized events.
///
/// A rename is reported as a remove of the old path followed by a create of
/// the new one, never as a single atomic rename event.
fn normalize(event: Event) -> Vec<WatchEvent> {
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .take(1)
            .map(|p| WatchEvent::new(WatchEventKind::Created, p))
            .collect(),
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => {
            let mut paths = event.paths.into_iter();
            match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => vec![
                    WatchEvent::new(WatchEventKind::Removed, from),
                    WatchEvent::new(WatchEventKind::Created, to),
                ],
                // Some backends report rename halves as single-path events.
                (Some(only), None) => vec![WatchEvent::new(WatchEventKind::Modified, only)],
                _ => vec![],
            }
        }
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .take(1)
            .map(|p| WatchEvent::new(WatchEventKind::Modified, p))
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .take(1)
            .map(|p| WatchEvent::new(WatchEventKind::Removed, p))
            .collect(),
        _ => vec![],
    }
}
