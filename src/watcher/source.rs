//! File event sources and subscription handles.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;
use super::event::{EventKinds, FileEvent, FileEventKind};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Which files a subscription observes: roots plus a glob filter.
///
/// A glob without `/` matches the file name anywhere below a root;
/// otherwise it is matched against the path relative to the root.
#[derive(Debug, Clone)]
pub struct WatchScope {
    roots: Vec<PathBuf>,
    glob: String,
    pattern: Pattern,
    match_file_name: bool,
}

impl WatchScope {
    pub fn new(roots: Vec<PathBuf>, glob: &str) -> Result<Self, WatchError> {
        let pattern = Pattern::new(glob).map_err(|e| WatchError::InvalidGlob {
            pattern: glob.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            roots,
            glob: glob.to_string(),
            pattern,
            match_file_name: !glob.contains('/'),
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| {
            let Ok(relative) = path.strip_prefix(root) else {
                return false;
            };
            if relative.as_os_str().is_empty() {
                return false;
            }

            if self.match_file_name {
                path.file_name().is_some_and(|name| {
                    self.pattern
                        .matches_with(&name.to_string_lossy(), MATCH_OPTIONS)
                })
            } else {
                self.pattern.matches_path_with(relative, MATCH_OPTIONS)
            }
        })
    }
}

/// Delivers events for one subscription into the service channel.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<FileEvent>,
    generation: u64,
    watcher: usize,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<FileEvent>, generation: u64, watcher: usize) -> Self {
        Self {
            tx,
            generation,
            watcher,
        }
    }

    /// Send one event. Returns false once the receiving side is gone.
    pub fn emit(&self, kind: FileEventKind, path: PathBuf) -> bool {
        self.tx
            .send(FileEvent {
                kind,
                path,
                watcher: self.watcher,
                generation: self.generation,
            })
            .is_ok()
    }
}

/// A live observation. Disposing it stops further events.
pub trait Subscription: Send {
    fn dispose(&mut self);
}

/// Opens subscriptions for watcher declarations.
pub trait EventSource: Send {
    /// Start observing `kinds` events inside `scope`, delivering to `sink`.
    fn subscribe(
        &self,
        scope: &WatchScope,
        kinds: EventKinds,
        sink: EventSink,
    ) -> Result<Box<dyn Subscription>, WatchError>;
}

/// Map a raw notify event to file events.
///
/// Metadata and access notifications carry no content change and are
/// dropped. Renames surface as a delete of the old path and a create of
/// the new one.
pub fn classify(event: &Event) -> Vec<(FileEventKind, PathBuf)> {
    let all = |kind: FileEventKind| -> Vec<(FileEventKind, PathBuf)> {
        event.paths.iter().map(|p| (kind, p.clone())).collect()
    };

    match event.kind {
        EventKind::Create(_) => all(FileEventKind::Created),
        EventKind::Remove(_) => all(FileEventKind::Deleted),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(FileEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(FileEventKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut events = Vec::new();
            if let Some(from) = event.paths.first() {
                events.push((FileEventKind::Deleted, from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                events.push((FileEventKind::Created, to.clone()));
            }
            events
        }
        EventKind::Modify(_) => all(FileEventKind::Changed),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// OS-backed event source using `notify`'s recommended watcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyEventSource;

struct NotifySubscription {
    watcher: Option<notify::RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl Subscription for NotifySubscription {
    fn dispose(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            for root in &self.roots {
                if let Err(e) = watcher.unwatch(root) {
                    crate::debug_event!("watcher", "unwatch failed", "{}: {e}", root.display());
                }
            }
        }
    }
}

impl Drop for NotifySubscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl EventSource for NotifyEventSource {
    fn subscribe(
        &self,
        scope: &WatchScope,
        kinds: EventKinds,
        sink: EventSink,
    ) -> Result<Box<dyn Subscription>, WatchError> {
        let filter = scope.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for (kind, path) in classify(&event) {
                    if !kinds.contains(EventKinds::from(kind)) || !filter.matches(&path) {
                        continue;
                    }
                    if !sink.emit(kind, path) {
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::error!("[watcher] file watch error: {e}");
            }
        })?;

        for root in scope.roots() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: root.clone(),
                    reason: e.to_string(),
                })?;
            crate::debug_event!("watcher", "watching", "{}", root.display());
        }

        Ok(Box::new(NotifySubscription {
            watcher: Some(watcher),
            roots: scope.roots().to_vec(),
        }))
    }
}
