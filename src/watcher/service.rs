//! The running watcher daemon.
//!
//! Owns the registry, the debouncer and the shared state, and routes
//! file events to the action executor.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::config_reload::ConfigReloadWatcher;
use super::debouncer::Debouncer;
use super::event::{FileEvent, FileEventKind, SaveOrigin};
use super::registry::{ReloadReport, WatcherRegistry};
use super::source::{EventSource, NotifyEventSource};
use crate::actions::{ActionExecutor, ExecutionReport};
use crate::config::Settings;
use crate::host::{ConsoleUi, DocumentHost, FsDocumentHost, Ui};
use crate::state::SharedState;
use crate::variables::{Environment, SystemEnvironment};

/// How often pending changes are flushed and expired saves swept.
const TICK: Duration = Duration::from_millis(100);

/// Coordinates watchers, save attribution and action execution.
pub struct WatchService {
    settings: Settings,
    settings_path: Option<PathBuf>,
    registry: WatcherRegistry,
    debouncer: Debouncer,
    events: mpsc::UnboundedReceiver<FileEvent>,
    executor: Arc<ActionExecutor>,
    state: Arc<SharedState>,
    ui: Arc<dyn Ui>,
    env: Arc<dyn Environment>,
}

impl WatchService {
    /// Create a builder for configuring the service.
    pub fn builder() -> WatchServiceBuilder {
        WatchServiceBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &WatcherRegistry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Rebuild watchers from `settings`.
    pub fn apply_settings(&mut self, settings: Settings) -> ReloadReport {
        self.state
            .saves
            .lock()
            .set_window(settings.save_tracking.window_ms);
        self.debouncer = Debouncer::new(settings.debounce_ms);
        self.settings = settings;

        let workspace = Arc::new(self.settings.workspace());
        let report =
            self.registry
                .reload(self.settings.declarations(), workspace, self.env.as_ref());

        for diagnostic in &report.diagnostics {
            self.ui.show_error(diagnostic);
        }
        report
    }

    /// Re-read the settings file and rebuild watchers.
    ///
    /// Invalid settings leave zero watchers active and are reported.
    pub fn reload(&mut self) -> ReloadReport {
        let Some(path) = self.settings_path.clone() else {
            return self.apply_settings(self.settings.clone());
        };

        match Settings::load_from(&path) {
            Ok(settings) => self.apply_settings(settings),
            Err(e) => {
                tracing::error!("[config] {}: {e}", path.display());
                self.ui.show_error(&e.to_string());

                self.debouncer = Debouncer::new(self.settings.debounce_ms);
                let workspace = Arc::new(self.settings.workspace());
                let mut report = self.registry.reload(&[], workspace, self.env.as_ref());
                report.diagnostics.push(e.to_string());
                report
            }
        }
    }

    /// Record that the editor just saved `path`.
    pub fn note_saved(&self, path: &Path) {
        self.state.saves.lock().mark_saved(path);
    }

    /// Route one event from a subscription.
    ///
    /// A change is attributed to an editor or external save as it arrives,
    /// then waits in the debouncer unless debouncing is disabled; creates
    /// and deletes run right away. Returns the task running the actions, if
    /// any were started.
    pub fn handle_event(&mut self, event: FileEvent) -> Option<JoinHandle<ExecutionReport>> {
        match event.kind {
            FileEventKind::Changed if !self.debouncer.is_disabled() => {
                let origin = self.origin_of(&event.path);
                self.debouncer.record(event, origin);
                None
            }
            FileEventKind::Deleted => {
                self.debouncer.remove(&event.path);
                self.dispatch_now(event)
            }
            _ => self.dispatch_now(event),
        }
    }

    /// Filter `event` through the registry and start its actions.
    pub fn dispatch_now(&self, event: FileEvent) -> Option<JoinHandle<ExecutionReport>> {
        let origin = self.origin_of(&event.path);
        self.dispatch_as(event, origin)
    }

    fn origin_of(&self, path: &Path) -> SaveOrigin {
        self.state.saves.lock().origin(path)
    }

    fn dispatch_as(
        &self,
        event: FileEvent,
        origin: SaveOrigin,
    ) -> Option<JoinHandle<ExecutionReport>> {
        let dispatch = self.registry.dispatch(&event, origin)?;

        crate::debug_event!(
            "watcher",
            event.kind.as_str(),
            "{} ({} actions)",
            event.path.display(),
            dispatch.actions().len()
        );

        let executor = self.executor.clone();
        Some(tokio::spawn(async move {
            executor
                .run_actions(&event, dispatch.actions(), &dispatch.workspace)
                .await
        }))
    }

    /// Dispatch debounced changes that have gone quiet.
    pub fn flush_ready(&mut self) -> Vec<JoinHandle<ExecutionReport>> {
        let ready = self.debouncer.take_ready();
        ready
            .into_iter()
            .filter_map(|(event, origin)| self.dispatch_as(event, origin))
            .collect()
    }

    /// Forget saves whose attribution window has passed.
    pub fn sweep(&self) -> usize {
        self.state.saves.lock().sweep()
    }

    /// Dispose every subscription.
    pub fn shutdown(&mut self) -> usize {
        let disposed = self.registry.teardown();
        crate::log_event!("watcher", "stopped", "{disposed} subscriptions disposed");
        disposed
    }

    /// Run until Ctrl-C.
    pub async fn run(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[watcher] cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the event loop until `shutdown` completes.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) {
        let report = self.apply_settings(self.settings.clone());
        crate::log_event!(
            "watcher",
            "started",
            "{} of {} watchers active",
            report.active,
            report.declared
        );

        let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
        let reload_task = self.settings_path.clone().map(|path| {
            let poll = Duration::from_millis(self.settings.config_poll_ms.max(1));
            tokio::spawn(ConfigReloadWatcher::new(path, poll).watch(reload_tx.clone()))
        });

        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => {
                    self.handle_event(event);
                }

                Some(()) = reload_rx.recv() => {
                    crate::log_event!("config", "settings changed, reloading");
                    self.reload();
                }

                _ = ticker.tick() => {
                    self.flush_ready();
                    let swept = self.sweep();
                    if swept > 0 {
                        tracing::trace!("[watcher] swept {swept} expired saves");
                    }
                }

                _ = &mut shutdown => {
                    break;
                }
            }
        }

        if let Some(task) = reload_task {
            task.abort();
        }
        drop(reload_tx);
        self.shutdown();
    }
}

/// Builder for [`WatchService`].
pub struct WatchServiceBuilder {
    settings: Settings,
    settings_path: Option<PathBuf>,
    ui: Option<Arc<dyn Ui>>,
    documents: Option<Arc<dyn DocumentHost>>,
    env: Option<Arc<dyn Environment>>,
    source: Option<Box<dyn EventSource>>,
}

impl WatchServiceBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            settings_path: None,
            ui: None,
            documents: None,
            env: None,
            source: None,
        }
    }

    /// Set the initial settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Settings file to re-read when it changes.
    pub fn settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn documents(mut self, documents: Arc<dyn DocumentHost>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn environment(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn source(mut self, source: impl EventSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the service. Watchers are created by the first
    /// [`WatchService::apply_settings`] or when the service runs.
    pub fn build(self) -> WatchService {
        let settings = self.settings;

        let ui = self
            .ui
            .unwrap_or_else(|| Arc::new(ConsoleUi::new()) as Arc<dyn Ui>);
        let documents = self.documents.unwrap_or_else(|| {
            Arc::new(FsDocumentHost::new(settings.editor.open_command.clone()))
                as Arc<dyn DocumentHost>
        });
        let env = self
            .env
            .unwrap_or_else(|| {
                Arc::new(SystemEnvironment::new(settings.platform)) as Arc<dyn Environment>
            });
        let source = self
            .source
            .unwrap_or_else(|| Box::new(NotifyEventSource) as Box<dyn EventSource>);

        let state = Arc::new(SharedState::new(settings.save_tracking.window_ms));
        let executor = Arc::new(ActionExecutor::new(
            ui.clone(),
            documents,
            env.clone(),
            state.clone(),
        ));

        // Create channel for events
        let (tx, events) = mpsc::unbounded_channel();

        WatchService {
            debouncer: Debouncer::new(settings.debounce_ms),
            registry: WatcherRegistry::new(source, tx),
            settings_path: self.settings_path,
            settings,
            events,
            executor,
            state,
            ui,
            env,
        }
    }
}

impl Default for WatchServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
