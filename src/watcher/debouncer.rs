//! Coalescing of bursts of change events.
//!
//! A single save often produces several modify notifications. Change
//! events are held until the file has been quiet for the configured
//! duration, then dispatched once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::event::{FileEvent, SaveOrigin};

/// (generation, watcher, path)
type EventKey = (u64, usize, PathBuf);

/// Debounces change events per watcher and path.
///
/// Each pending change keeps the save origin it had when it arrived, so a
/// late flush does not reattribute it.
#[derive(Debug)]
pub struct Debouncer {
    /// Pending changes: key -> (event, origin on arrival, last seen).
    pending: HashMap<EventKey, (FileEvent, SaveOrigin, Instant)>,
    /// How long a file must be quiet before its change is released.
    duration: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given duration in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Whether events pass straight through.
    pub fn is_disabled(&self) -> bool {
        self.duration.is_zero()
    }

    /// Record a change event, resetting its quiet timer. The latest
    /// arrival's origin wins.
    pub fn record(&mut self, event: FileEvent, origin: SaveOrigin) {
        self.record_at(event, origin, Instant::now());
    }

    pub fn record_at(&mut self, event: FileEvent, origin: SaveOrigin, now: Instant) {
        let key = (event.generation, event.watcher, event.path.clone());
        self.pending.insert(key, (event, origin, now));
    }

    /// Forget pending changes for a path (e.g. it was deleted).
    pub fn remove(&mut self, path: &Path) {
        self.pending.retain(|(_, _, pending), _| pending.as_path() != path);
    }

    /// Take all events that have been quiet for the debounce duration.
    pub fn take_ready(&mut self) -> Vec<(FileEvent, SaveOrigin)> {
        self.take_ready_at(Instant::now())
    }

    pub fn take_ready_at(&mut self, now: Instant) -> Vec<(FileEvent, SaveOrigin)> {
        let mut ready = Vec::new();

        self.pending.retain(|_, (event, origin, last_seen)| {
            if now.duration_since(*last_seen) >= self.duration {
                ready.push((event.clone(), *origin));
                false
            } else {
                true
            }
        });

        ready
    }
}
