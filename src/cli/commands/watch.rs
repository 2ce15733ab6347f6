//! Watch command - run the daemon.

use std::path::PathBuf;

use crate::config::Settings;
use crate::watcher::WatchService;

/// Run watch command - watch until Ctrl-C, reloading on settings edits.
pub async fn run_watch(config: Settings, settings_path: PathBuf) -> anyhow::Result<()> {
    if config.declarations().is_empty() {
        eprintln!(
            "No watchers declared in {}; waiting for the file to change.",
            settings_path.display()
        );
    }

    let service = WatchService::builder()
        .settings(config)
        .settings_path(settings_path)
        .build();

    eprintln!("Watching. Press Ctrl-C to stop.");
    service.run().await;
    Ok(())
}
