//! Settings file change notifier.
//!
//! Polls the settings file's modification time and signals the service
//! when it changes, so watchers are rebuilt without a restart.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Watches one settings file for edits.
pub struct ConfigReloadWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    check_interval: Duration,
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path)
        .ok()
        .and_then(|meta| meta.modified().ok())
}

impl ConfigReloadWatcher {
    /// Start from the file's current state; only later edits are reported.
    pub fn new(path: impl Into<PathBuf>, check_interval: Duration) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            last_modified,
            check_interval,
        }
    }

    /// Whether the file was created, edited or removed since the last check.
    pub fn check(&mut self) -> bool {
        let current = modified(&self.path);
        let changed = match (self.last_modified, current) {
            (Some(last), Some(now)) => now != last,
            (None, None) => false,
            _ => true,
        };

        if changed {
            self.last_modified = current;
            crate::debug_event!("config", "changed", "{}", self.path.display());
        }
        changed
    }

    /// Poll until the receiver goes away, sending one tick per change.
    pub async fn watch(mut self, tx: mpsc::UnboundedSender<()>) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if tx.is_closed() {
                break;
            }
            if self.check() && tx.send(()).is_err() {
                break;
            }
        }

        crate::debug_event!("config", "reload watcher stopped");
    }
}
