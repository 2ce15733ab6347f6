//! State shared between the service loop and running action lists.

use parking_lot::Mutex;

use crate::actions::StatusIndicatorCache;
use crate::watcher::SaveOriginTracker;

/// Process-wide mutable state, owned by the service and handed to the
/// executor by `Arc`.
///
/// Locks are only held for the duration of a synchronous update, never
/// across an `.await`.
#[derive(Debug)]
pub struct SharedState {
    pub status: Mutex<StatusIndicatorCache>,
    pub saves: Mutex<SaveOriginTracker>,
}

impl SharedState {
    pub fn new(save_window_ms: u64) -> Self {
        Self {
            status: Mutex::new(StatusIndicatorCache::new()),
            saves: Mutex::new(SaveOriginTracker::new(save_window_ms)),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            status: Mutex::new(StatusIndicatorCache::new()),
            saves: Mutex::new(SaveOriginTracker::default()),
        }
    }
}
