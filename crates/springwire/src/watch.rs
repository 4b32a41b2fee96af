//! File system watcher for incremental workspace updates.
//!
//! Watches `.java` files under a root and reports debounced create, modify,
//! delete and rename events so the workspace can re-analyze only what changed.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::{DataChange, ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer, RecommendedCache,
};

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file was created
    Created(PathBuf),
    /// A file was modified
    Modified(PathBuf),
    /// A file was deleted
    Deleted(PathBuf),
    /// A file was renamed (old path, new path)
    Renamed(PathBuf, PathBuf),
}

/// Whether `path` is a Java source file.
pub fn is_java_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "java")
}

/// Check if an event kind represents actual content changes worth processing.
/// Filters out noisy events like metadata-only changes and access events.
fn is_meaningful_event(kind: &EventKind) -> bool {
    match kind {
        // Metadata-only changes (permissions, timestamps) - no content change
        EventKind::Modify(ModifyKind::Metadata(_)) => false,

        // "Any" data change is often spurious with no real modification
        EventKind::Modify(ModifyKind::Data(DataChange::Any)) => false,

        EventKind::Access(_) => false,
        EventKind::Other => false,
        _ => true,
    }
}

/// Map a raw event kind and its paths to a [`WatchEvent`] for Java files.
fn classify_event(kind: &EventKind, paths: &[PathBuf]) -> Option<WatchEvent> {
    if !is_meaningful_event(kind) {
        return None;
    }

    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = kind {
        if let [from, to] = paths {
            return match (is_java_file(from), is_java_file(to)) {
                (true, true) => Some(WatchEvent::Renamed(from.clone(), to.clone())),
                (true, false) => Some(WatchEvent::Deleted(from.clone())),
                (false, true) => Some(WatchEvent::Created(to.clone())),
                (false, false) => None,
            };
        }
    }

    let path = paths.iter().find(|p| is_java_file(p))?.clone();
    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path)),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(WatchEvent::Deleted(path)),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(WatchEvent::Created(path)),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path)),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path)),
        EventKind::Any => Some(WatchEvent::Modified(path)),
        _ => None,
    }
}

/// Default debounce duration for the DebouncedFileWatcher
pub const DEFAULT_DEBOUNCE_DURATION: Duration = Duration::from_millis(200);

/// A debounced file system watcher that reduces duplicate events.
///
/// Uses `notify-debouncer-full`, which merges rapid events and tracks
/// renames through file IDs.
///
/// # Example
/// ```ignore
/// let mut watcher = DebouncedFileWatcher::with_defaults(&root)?;
/// watcher.start()?;
///
/// loop {
///     for event in watcher.wait_timeout(Duration::from_millis(500)) {
///         match event {
///             WatchEvent::Modified(path) => workspace.update_file(&path, &std::fs::read_to_string(&path)?),
///             WatchEvent::Deleted(path) => workspace.remove_file(&path),
///             _ => {}
///         }
///     }
/// }
/// ```
pub struct DebouncedFileWatcher {
    debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    receiver: Receiver<DebounceEventResult>,
    root: PathBuf,
}

impl DebouncedFileWatcher {
    /// Create a new debounced file watcher.
    ///
    /// # Arguments
    /// * `root` - The root directory to watch
    /// * `debounce_duration` - How long to wait before emitting events (recommended: 200ms)
    pub fn new(root: &Path, debounce_duration: Duration) -> crate::Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();

        let debouncer = new_debouncer(
            debounce_duration,
            None, // Use default tick rate
            move |result: DebounceEventResult| {
                let _ = tx.send(result);
            },
        )?;

        Ok(Self {
            debouncer,
            receiver: rx,
            root: root.to_path_buf(),
        })
    }

    /// Create a new debounced file watcher with default debounce duration (200ms).
    pub fn with_defaults(root: &Path) -> crate::Result<Self> {
        Self::new(root, DEFAULT_DEBOUNCE_DURATION)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start watching the root directory.
    pub fn start(&mut self) -> crate::Result<()> {
        self.debouncer
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| notify::Error::generic(&e.to_string()).into())
    }

    /// Stop watching the root directory.
    pub fn stop(&mut self) -> crate::Result<()> {
        self.debouncer
            .unwatch(&self.root)
            .map_err(|e| notify::Error::generic(&e.to_string()).into())
    }

    /// Poll for debounced events, returning all available events.
    ///
    /// This is non-blocking and returns an empty vec if no events are available.
    pub fn poll_events(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            Self::collect(result, &mut events);
        }
        events
    }

    /// Wait for events with a timeout, returning all events that arrive.
    pub fn wait_timeout(&self, timeout: Duration) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Self::collect(result, &mut events),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return events;
            }
        }

        // Drain any additional events that arrived
        events.extend(self.poll_events());
        events
    }

    fn collect(result: DebounceEventResult, events: &mut Vec<WatchEvent>) {
        match result {
            Ok(debounced_events) => {
                events.extend(debounced_events.iter().filter_map(process_debounced_event));
            }
            Err(errors) => {
                for error in errors {
                    tracing::warn!("Debounced watch error: {:?}", error);
                }
            }
        }
    }
}

fn process_debounced_event(event: &DebouncedEvent) -> Option<WatchEvent> {
    classify_event(&event.kind, &event.paths)
}
