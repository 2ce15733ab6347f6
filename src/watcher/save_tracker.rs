//! Time-bounded record of files the editor just saved.
//!
//! A change event for a path recorded here is attributed to an internal
//! save; anything else counts as an external write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::event::SaveOrigin;

/// Default attribution window in milliseconds.
pub const DEFAULT_SAVE_WINDOW_MS: u64 = 500;

/// Paths saved by the editor, each with an expiry deadline.
///
/// Membership is checked lazily against the deadline, so an expired entry
/// is never reported even if [`SaveOriginTracker::sweep`] has not run yet.
#[derive(Debug)]
pub struct SaveOriginTracker {
    /// path -> instant the entry stops counting.
    deadlines: HashMap<PathBuf, Instant>,
    window: Duration,
}

impl SaveOriginTracker {
    /// Create a tracker with the given window in milliseconds.
    pub fn new(window_ms: u64) -> Self {
        Self {
            deadlines: HashMap::new(),
            window: Duration::from_millis(window_ms),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the window for saves recorded from now on.
    pub fn set_window(&mut self, window_ms: u64) {
        self.window = Duration::from_millis(window_ms);
    }

    /// Record that `path` was just saved by the editor.
    pub fn mark_saved(&mut self, path: &Path) {
        self.mark_saved_at(path, Instant::now());
    }

    /// Record a save that completed at `now`.
    pub fn mark_saved_at(&mut self, path: &Path, now: Instant) {
        self.deadlines.insert(path.to_path_buf(), now + self.window);
    }

    /// Attribute a change of `path` observed now.
    pub fn origin(&self, path: &Path) -> SaveOrigin {
        self.origin_at(path, Instant::now())
    }

    /// Attribute a change of `path` observed at `now`.
    pub fn origin_at(&self, path: &Path, now: Instant) -> SaveOrigin {
        match self.deadlines.get(path) {
            Some(deadline) if now < *deadline => SaveOrigin::Editor,
            _ => SaveOrigin::External,
        }
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|_, deadline| now < *deadline);
        before - self.deadlines.len()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl Default for SaveOriginTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_WINDOW_MS)
    }
}
