//! Runs declared action lists against the UI and document collaborators.

use std::path::Path;
use std::sync::Arc;

use super::{Action, StatusUpdate};
use crate::host::{DocumentHost, HostError, NotificationResponse, Ui};
use crate::state::SharedState;
use crate::variables::{Environment, Expansion, VariableResolver, Workspace};
use crate::watcher::FileEvent;

/// Label of the open affordance when an action does not set one.
pub const DEFAULT_OPEN_LABEL: &str = "Open";

/// Outcome of one action list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Actions that completed.
    pub executed: usize,
    /// Actions that failed and were reported.
    pub failed: usize,
}

/// Executes action lists in declaration order.
///
/// Failures are reported through [`Ui::show_error`] and never stop the
/// rest of the list.
pub struct ActionExecutor {
    ui: Arc<dyn Ui>,
    documents: Arc<dyn DocumentHost>,
    env: Arc<dyn Environment>,
    state: Arc<SharedState>,
}

impl ActionExecutor {
    pub fn new(
        ui: Arc<dyn Ui>,
        documents: Arc<dyn DocumentHost>,
        env: Arc<dyn Environment>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            ui,
            documents,
            env,
            state,
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Run `actions` for `event`, one after another.
    pub async fn run_actions(
        &self,
        event: &FileEvent,
        actions: &[Action],
        workspace: &Workspace,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for action in actions {
            crate::debug_event!(
                "actions",
                action.key(),
                "{} {}",
                event.kind,
                event.path.display()
            );

            match self.run_action(event, action, workspace).await {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("[actions] {} failed: {e}", action.key());
                    self.ui.show_error(&e.to_string());
                }
            }
        }

        report
    }

    async fn run_action(
        &self,
        event: &FileEvent,
        action: &Action,
        workspace: &Workspace,
    ) -> Result<(), HostError> {
        match action {
            Action::ShowStatus(update) => {
                self.show_status(event, update, workspace);
                Ok(())
            }
            Action::RemoveStatus { id } => {
                self.remove_status(id);
                Ok(())
            }
            Action::Notify {
                message,
                open_label,
            } => {
                let message = self.expand(message, &event.path, workspace);
                let label = open_label.as_deref().unwrap_or(DEFAULT_OPEN_LABEL);

                match self.ui.notify(&message, label).await {
                    NotificationResponse::Opened => self.documents.open(&event.path).await,
                    NotificationResponse::Dismissed => Ok(()),
                }
            }
            Action::AutoSave => self.force_save(&event.path).await,
        }
    }

    fn show_status(&self, event: &FileEvent, update: &StatusUpdate, workspace: &Workspace) {
        let resolved = StatusUpdate {
            text: update
                .text
                .as_deref()
                .map(|text| self.expand(text, &event.path, workspace)),
            tooltip: update
                .tooltip
                .as_deref()
                .map(|tooltip| self.expand(tooltip, &event.path, workspace)),
            ..update.clone()
        };

        let item = self.state.status.lock().apply(&resolved);
        self.ui.show_status(&item);
    }

    fn remove_status(&self, id: &str) {
        let removed = self.state.status.lock().remove(id);
        match removed {
            Some(_) => self.ui.hide_status(id),
            None => crate::debug_event!("actions", "no status item to remove", "{id}"),
        }
    }

    /// Reload the file from disk and push it through the save pipeline.
    ///
    /// The save is recorded before the write lands so the change event it
    /// causes is attributed to the editor.
    async fn force_save(&self, path: &Path) -> Result<(), HostError> {
        let document = self.documents.load(path).await?;

        self.state.saves.lock().mark_saved(path);
        self.documents.save(&document).await?;
        self.state.saves.lock().mark_saved(path);

        crate::log_event!("actions", "saved", "{}", path.display());
        Ok(())
    }

    /// Expand a template for the triggering file and report diagnostics.
    fn expand(&self, template: &str, file: &Path, workspace: &Workspace) -> String {
        let Expansion {
            value, diagnostics, ..
        } = VariableResolver::new(self.env.as_ref(), workspace)
            .with_file(file)
            .expand(template);

        for diagnostic in diagnostics {
            tracing::warn!("[actions] {diagnostic}");
            self.ui.show_error(&diagnostic.to_string());
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::StatusItem;
    use crate::host::Document;
    use crate::variables::{Platform, StaticEnvironment, WorkspaceFolder};
    use crate::watcher::{FileEventKind, SaveOrigin};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingUi {
        shown: Mutex<Vec<StatusItem>>,
        hidden: Mutex<Vec<String>>,
        notes: Mutex<Vec<(String, String)>>,
        errors: Mutex<Vec<String>>,
        open_on_notify: bool,
    }

    #[async_trait]
    impl Ui for RecordingUi {
        fn show_status(&self, item: &StatusItem) {
            self.shown.lock().push(item.clone());
        }

        fn hide_status(&self, id: &str) {
            self.hidden.lock().push(id.to_string());
        }

        async fn notify(&self, message: &str, open_label: &str) -> NotificationResponse {
            self.notes
                .lock()
                .push((message.to_string(), open_label.to_string()));
            if self.open_on_notify {
                NotificationResponse::Opened
            } else {
                NotificationResponse::Dismissed
            }
        }

        fn show_error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct MemoryDocuments {
        files: Mutex<HashMap<PathBuf, Vec<u8>>>,
        saved: Mutex<Vec<PathBuf>>,
        opened: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl DocumentHost for MemoryDocuments {
        async fn load(&self, path: &Path) -> Result<Document, HostError> {
            let content = self.files.lock().get(path).cloned().ok_or_else(|| {
                HostError::Read {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }
            })?;
            Ok(Document {
                path: path.to_path_buf(),
                content,
            })
        }

        async fn save(&self, document: &Document) -> Result<(), HostError> {
            self.saved.lock().push(document.path.clone());
            Ok(())
        }

        async fn open(&self, path: &Path) -> Result<(), HostError> {
            self.opened.lock().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Fixture {
        ui: Arc<RecordingUi>,
        documents: Arc<MemoryDocuments>,
        executor: ActionExecutor,
        workspace: Workspace,
    }

    fn fixture(open_on_notify: bool) -> Fixture {
        let ui = Arc::new(RecordingUi {
            open_on_notify,
            ..Default::default()
        });
        let documents = Arc::new(MemoryDocuments::default());
        let env = Arc::new(StaticEnvironment::new(Platform::Posix).with_var("HOME", "/home/dev"));
        let executor = ActionExecutor::new(
            ui.clone(),
            documents.clone(),
            env,
            Arc::new(SharedState::default()),
        );
        Fixture {
            ui,
            documents,
            executor,
            workspace: Workspace::new(vec![WorkspaceFolder::from_root("/proj")]),
        }
    }

    fn event(path: &str) -> FileEvent {
        FileEvent {
            kind: FileEventKind::Changed,
            path: PathBuf::from(path),
            watcher: 0,
            generation: 1,
        }
    }

    fn show(id: &str, text: &str) -> Action {
        Action::ShowStatus(StatusUpdate {
            id: id.to_string(),
            text: Some(text.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_show_status_expands_and_caches() {
        let f = fixture(false);
        let report = f
            .executor
            .run_actions(
                &event("/proj/src/app.js"),
                &[show("build", "${fileBasename} changed")],
                &f.workspace,
            )
            .await;

        assert_eq!(report, ExecutionReport { executed: 1, failed: 0 });
        let shown = f.ui.shown.lock();
        assert_eq!(shown[0].text, "app.js changed");
        assert!(shown[0].visible);
        assert!(f.executor.state().status.lock().contains("build"));
    }

    #[tokio::test]
    async fn test_remove_unknown_status_is_noop() {
        let f = fixture(false);
        let report = f
            .executor
            .run_actions(
                &event("/proj/a.js"),
                &[Action::RemoveStatus {
                    id: "missing".to_string(),
                }],
                &f.workspace,
            )
            .await;

        assert_eq!(report, ExecutionReport { executed: 1, failed: 0 });
        assert!(f.ui.hidden.lock().is_empty());
        assert!(f.ui.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_remove_hides_cached_status() {
        let f = fixture(false);
        let actions = [
            show("build", "ok"),
            Action::RemoveStatus {
                id: "build".to_string(),
            },
        ];
        f.executor
            .run_actions(&event("/proj/a.js"), &actions, &f.workspace)
            .await;

        assert_eq!(*f.ui.hidden.lock(), vec!["build".to_string()]);
        assert!(f.executor.state().status.lock().is_empty());
    }

    #[tokio::test]
    async fn test_notify_uses_default_label_and_opens() {
        let f = fixture(true);
        let actions = [Action::Notify {
            message: "${relativeFile} was created".to_string(),
            open_label: None,
        }];
        f.executor
            .run_actions(&event("/proj/src/app.js"), &actions, &f.workspace)
            .await;

        assert_eq!(
            *f.ui.notes.lock(),
            vec![("src/app.js was created".to_string(), "Open".to_string())]
        );
        assert_eq!(*f.documents.opened.lock(), vec![PathBuf::from("/proj/src/app.js")]);
    }

    #[tokio::test]
    async fn test_dismissed_notification_does_not_open() {
        let f = fixture(false);
        let actions = [Action::Notify {
            message: "hi".to_string(),
            open_label: Some("Show".to_string()),
        }];
        f.executor
            .run_actions(&event("/proj/a.js"), &actions, &f.workspace)
            .await;

        assert_eq!(f.ui.notes.lock()[0].1, "Show");
        assert!(f.documents.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_reports_diagnostic() {
        let f = fixture(false);
        let actions = [Action::Notify {
            message: "${workspaceFolder:nope}".to_string(),
            open_label: None,
        }];
        let report = f
            .executor
            .run_actions(&event("/proj/a.js"), &actions, &f.workspace)
            .await;

        assert_eq!(report.failed, 0);
        assert_eq!(f.ui.notes.lock()[0].0, "<unresolved:workspaceFolder:nope>");
        assert_eq!(f.ui.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_save_marks_editor_origin() {
        let f = fixture(false);
        f.documents
            .files
            .lock()
            .insert(PathBuf::from("/proj/a.js"), b"x".to_vec());

        let report = f
            .executor
            .run_actions(&event("/proj/a.js"), &[Action::AutoSave], &f.workspace)
            .await;

        assert_eq!(report.executed, 1);
        assert_eq!(*f.documents.saved.lock(), vec![PathBuf::from("/proj/a.js")]);
        assert_eq!(
            f.executor.state().saves.lock().origin(Path::new("/proj/a.js")),
            SaveOrigin::Editor
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_list_continues() {
        let f = fixture(false);
        let actions = [Action::AutoSave, show("after", "still runs")];
        let report = f
            .executor
            .run_actions(&event("/proj/missing.js"), &actions, &f.workspace)
            .await;

        assert_eq!(report, ExecutionReport { executed: 1, failed: 1 });
        assert_eq!(f.ui.errors.lock().len(), 1);
        assert_eq!(f.ui.shown.lock()[0].id, "after");
    }
}
