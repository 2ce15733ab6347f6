//! File event types shared by sources, the registry and the executor.

use std::fmt;
use std::path::PathBuf;

bitflags::bitflags! {
    /// Set of event kinds a subscription observes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventKinds: u8 {
        const CREATED = 1;
        const CHANGED = 1 << 1;
        const DELETED = 1 << 2;
    }
}

impl EventKinds {
    /// Lowercase names of the contained kinds.
    pub fn names(self) -> Vec<&'static str> {
        FileEventKind::ALL
            .into_iter()
            .filter(|kind| self.contains(EventKinds::from(*kind)))
            .map(FileEventKind::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    Created,
    Changed,
    Deleted,
}

impl FileEventKind {
    pub const ALL: [FileEventKind; 3] = [
        FileEventKind::Created,
        FileEventKind::Changed,
        FileEventKind::Deleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileEventKind::Created => "created",
            FileEventKind::Changed => "changed",
            FileEventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FileEventKind> for EventKinds {
    fn from(kind: FileEventKind) -> Self {
        match kind {
            FileEventKind::Created => EventKinds::CREATED,
            FileEventKind::Changed => EventKinds::CHANGED,
            FileEventKind::Deleted => EventKinds::DELETED,
        }
    }
}

/// Who wrote a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// Saved by this process (or the editor) moments ago.
    Editor,
    /// Written by something else.
    External,
}

/// One observed file event, tagged with the subscription that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
    /// Index of the active watcher inside its registry generation.
    pub watcher: usize,
    /// Registry generation the subscription belonged to.
    pub generation: u64,
}
