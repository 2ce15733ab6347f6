//! Active watcher subscriptions for one configuration load.
//!
//! Every reload tears down all live subscriptions before creating the new
//! ones. There is no diffing between old and new declarations.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::declaration::WatcherDeclaration;
use super::error::WatchError;
use super::event::{EventKinds, FileEvent, FileEventKind, SaveOrigin};
use super::source::{EventSink, EventSource, Subscription, WatchScope};
use crate::actions::Action;
use crate::variables::{Environment, ResolveError, VariableResolver, Workspace};

/// Lifecycle of the registry across configuration loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Idle,
    Building,
    Active,
}

struct ActiveWatcher {
    declaration: Arc<WatcherDeclaration>,
    scope: WatchScope,
    kinds: EventKinds,
    subscription: Box<dyn Subscription>,
}

/// Summary of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Declarations in the loaded configuration.
    pub declared: usize,
    /// Subscriptions now live.
    pub active: usize,
    /// Declarations that produced no subscription.
    pub skipped: usize,
    /// Problems worth showing to the user.
    pub diagnostics: Vec<String>,
}

/// An event that passed every filter, with what is needed to run it.
#[derive(Clone)]
pub struct Dispatch {
    pub declaration: Arc<WatcherDeclaration>,
    pub kind: FileEventKind,
    pub workspace: Arc<Workspace>,
}

impl Dispatch {
    pub fn actions(&self) -> &[Action] {
        self.declaration.actions_for(self.kind)
    }
}

/// Expand a declaration's root and combine it with its glob.
///
/// Without a `path` the scope covers every workspace folder. A relative
/// root is taken relative to the first folder. Resolution problems are
/// returned alongside the scope; they never prevent it from being built.
pub fn resolve_scope(
    declaration: &WatcherDeclaration,
    workspace: &Workspace,
    env: &dyn Environment,
) -> Result<(WatchScope, Vec<ResolveError>), WatchError> {
    let (roots, diagnostics) = match declaration.path.as_deref() {
        Some(template) => {
            let expansion = VariableResolver::new(env, workspace).expand(template);
            let mut root = PathBuf::from(&expansion.value);
            if root.is_relative() {
                if let Some(first) = workspace.folders().first() {
                    root = first.root.join(root);
                }
            }
            (vec![root], expansion.diagnostics)
        }
        None => {
            if workspace.is_empty() {
                return Err(WatchError::NoRoots {
                    reason: "no path given and no workspace folder is open".to_string(),
                });
            }
            let roots = workspace
                .folders()
                .iter()
                .map(|folder| folder.root.clone())
                .collect();
            (roots, Vec::new())
        }
    };

    let scope = WatchScope::new(roots, &declaration.glob_pattern)?;
    Ok((scope, diagnostics))
}

/// Owns the live subscriptions and decides which events run actions.
pub struct WatcherRegistry {
    source: Box<dyn EventSource>,
    tx: mpsc::UnboundedSender<FileEvent>,
    state: RegistryState,
    generation: u64,
    watchers: Vec<ActiveWatcher>,
    workspace: Arc<Workspace>,
}

impl WatcherRegistry {
    /// Create an idle registry. Subscriptions deliver into `tx`.
    pub fn new(source: Box<dyn EventSource>, tx: mpsc::UnboundedSender<FileEvent>) -> Self {
        Self {
            source,
            tx,
            state: RegistryState::Idle,
            generation: 0,
            watchers: Vec::new(),
            workspace: Arc::new(Workspace::default()),
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn active_count(&self) -> usize {
        self.watchers.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// Scopes of the live subscriptions, in subscription order.
    pub fn scopes(&self) -> impl Iterator<Item = &WatchScope> {
        self.watchers.iter().map(|watcher| &watcher.scope)
    }

    /// Replace every subscription with ones built from `declarations`.
    ///
    /// The previous generation is fully disposed before the first new
    /// subscription is created.
    pub fn reload(
        &mut self,
        declarations: &[WatcherDeclaration],
        workspace: Arc<Workspace>,
        env: &dyn Environment,
    ) -> ReloadReport {
        self.teardown();
        self.state = RegistryState::Building;
        self.workspace = workspace;

        let mut report = ReloadReport {
            declared: declarations.len(),
            ..Default::default()
        };

        for (index, declaration) in declarations.iter().enumerate() {
            match self.build(declaration, env) {
                Ok((watcher, diagnostics)) => {
                    crate::debug_event!(
                        "registry",
                        "subscribed",
                        "#{index} {} on {}",
                        watcher.scope.glob(),
                        watcher.kinds.names().join(",")
                    );
                    report
                        .diagnostics
                        .extend(diagnostics.iter().map(ToString::to_string));
                    self.watchers.push(watcher);
                }
                Err(None) => {
                    crate::debug_event!("registry", "no actions declared", "#{index}");
                    report.skipped += 1;
                }
                Err(Some(e)) => {
                    tracing::warn!("[registry] watcher #{index} skipped: {e}");
                    report.diagnostics.push(format!("Watcher #{index}: {e}"));
                    report.skipped += 1;
                }
            }
        }

        report.active = self.watchers.len();
        self.state = RegistryState::Active;
        crate::log_event!(
            "registry",
            "active",
            "{} of {} watchers (generation {})",
            report.active,
            report.declared,
            self.generation
        );
        report
    }

    /// Build one subscription. `Err(None)` means there was nothing to
    /// subscribe to.
    fn build(
        &self,
        declaration: &WatcherDeclaration,
        env: &dyn Environment,
    ) -> Result<(ActiveWatcher, Vec<ResolveError>), Option<WatchError>> {
        let kinds = declaration.event_kinds();
        if kinds.is_empty() {
            return Err(None);
        }

        let (scope, diagnostics) = resolve_scope(declaration, &self.workspace, env)?;
        let sink = EventSink::new(self.tx.clone(), self.generation, self.watchers.len());
        let subscription = self.source.subscribe(&scope, kinds, sink)?;

        Ok((
            ActiveWatcher {
                declaration: Arc::new(declaration.clone()),
                scope,
                kinds,
                subscription,
            },
            diagnostics,
        ))
    }

    /// Dispose every live subscription. Returns how many were disposed.
    ///
    /// Events already queued from the old generation are ignored from now
    /// on.
    pub fn teardown(&mut self) -> usize {
        let count = self.watchers.len();
        for mut watcher in self.watchers.drain(..) {
            watcher.subscription.dispose();
        }
        self.generation += 1;
        self.state = RegistryState::Idle;

        if count > 0 {
            crate::debug_event!("registry", "disposed", "{count} subscriptions");
        }
        count
    }

    /// Decide whether `event` runs actions.
    ///
    /// `origin` is how the change was attributed when it arrived; it only
    /// matters for change events.
    pub fn dispatch(&self, event: &FileEvent, origin: SaveOrigin) -> Option<Dispatch> {
        if self.state != RegistryState::Active || event.generation != self.generation {
            crate::debug_event!("registry", "stale event", "{}", event.path.display());
            return None;
        }

        let watcher = self.watchers.get(event.watcher)?;
        if !watcher.kinds.contains(EventKinds::from(event.kind))
            || !watcher.scope.matches(&event.path)
        {
            return None;
        }

        if event.kind == FileEventKind::Changed {
            if !watcher.declaration.accepts(origin) {
                crate::debug_event!(
                    "registry",
                    "change ignored",
                    "{} ({origin:?} save)",
                    event.path.display()
                );
                return None;
            }
        }

        Some(Dispatch {
            declaration: watcher.declaration.clone(),
            kind: event.kind,
            workspace: self.workspace.clone(),
        })
    }
}

impl Drop for WatcherRegistry {
    fn drop(&mut self) {
        for watcher in &mut self.watchers {
            watcher.subscription.dispose();
        }
    }
}
