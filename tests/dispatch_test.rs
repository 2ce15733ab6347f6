mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::{FakeSource, MemoryDocuments, RecordingUi, eventually};
use fwatch::actions::{Action, ExecutionReport, StatusUpdate};
use fwatch::variables::{Platform, StaticEnvironment};
use fwatch::watcher::{
    FileEvent, FileEventKind, RegistryState, WatchService, WatcherDeclaration,
};
use fwatch::Settings;

struct Harness {
    service: WatchService,
    ui: Arc<RecordingUi>,
    documents: Arc<MemoryDocuments>,
    source: FakeSource,
}

fn settings(watchers: Vec<WatcherDeclaration>) -> Settings {
    Settings {
        workspace_root: Some(PathBuf::from("/proj")),
        debounce_ms: 0,
        watchers,
        ..Default::default()
    }
}

fn harness_with(settings: Settings, ui: RecordingUi, documents: MemoryDocuments) -> Harness {
    let ui = Arc::new(ui);
    let documents = Arc::new(documents);
    let source = FakeSource::default();

    let service = WatchService::builder()
        .settings(settings)
        .ui(ui.clone())
        .documents(documents.clone())
        .environment(Arc::new(
            StaticEnvironment::new(Platform::Posix).with_var("HOME", "/home/dev"),
        ))
        .source(source.clone())
        .build();

    Harness {
        service,
        ui,
        documents,
        source,
    }
}

fn harness(settings: Settings) -> Harness {
    harness_with(settings, RecordingUi::default(), MemoryDocuments::default())
}

fn status(id: &str, text: &str) -> Action {
    Action::ShowStatus(StatusUpdate {
        id: id.to_string(),
        text: Some(text.to_string()),
        ..Default::default()
    })
}

fn event(h: &Harness, kind: FileEventKind, path: &str) -> FileEvent {
    FileEvent {
        kind,
        path: PathBuf::from(path),
        watcher: 0,
        generation: h.service.registry().generation(),
    }
}

fn ignore_editor_saves() -> WatcherDeclaration {
    WatcherDeclaration {
        trigger_on_editor_save: false,
        on_change: vec![status("changed", "${fileBasename}")],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_internal_save_within_window_runs_nothing() {
    let mut h = harness(settings(vec![ignore_editor_saves()]));
    let config = h.service.settings().clone();
    assert_eq!(h.service.apply_settings(config).active, 1);

    h.service.note_saved(Path::new("/proj/app.js"));
    let change = event(&h, FileEventKind::Changed, "/proj/app.js");

    assert!(h.service.handle_event(change).is_none());
    assert!(h.ui.shown.lock().is_empty());
}

#[tokio::test]
async fn test_change_after_window_runs_on_change() {
    let mut h = harness(settings(vec![ignore_editor_saves()]));
    let config = h.service.settings().clone();
    h.service.apply_settings(config);

    h.service.note_saved(Path::new("/proj/app.js"));
    tokio::time::sleep(Duration::from_millis(600)).await;

    let change = event(&h, FileEventKind::Changed, "/proj/app.js");
    let report = h
        .service
        .handle_event(change)
        .expect("onChange dispatched")
        .await
        .unwrap();

    assert_eq!(report, ExecutionReport { executed: 1, failed: 0 });
    assert_eq!(h.ui.shown.lock()[0].text, "app.js");
}

#[tokio::test]
async fn test_debounced_change_keeps_editor_attribution() {
    let config = Settings {
        debounce_ms: Settings::default().debounce_ms,
        ..settings(vec![ignore_editor_saves()])
    };
    assert!(config.debounce_ms > 0);
    let mut h = harness(config.clone());
    h.service.apply_settings(config);

    h.service.note_saved(Path::new("/proj/app.js"));
    tokio::time::sleep(Duration::from_millis(400)).await;

    let change = event(&h, FileEventKind::Changed, "/proj/app.js");
    assert!(h.service.handle_event(change).is_none());
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(h.service.flush_ready().is_empty());
    assert!(h.ui.shown.lock().is_empty());

    let external = event(&h, FileEventKind::Changed, "/proj/other.js");
    assert!(h.service.handle_event(external).is_none());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let handles = h.service.flush_ready();
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(h.ui.shown.lock()[0].text, "other.js");
}

#[tokio::test]
async fn test_save_window_is_configurable() {
    let mut config = settings(vec![ignore_editor_saves()]);
    config.save_tracking.window_ms = 50;
    let mut h = harness(config.clone());
    h.service.apply_settings(config);

    h.service.note_saved(Path::new("/proj/app.js"));
    tokio::time::sleep(Duration::from_millis(80)).await;

    let change = event(&h, FileEventKind::Changed, "/proj/app.js");
    assert!(h.service.handle_event(change).is_some());
}

#[tokio::test]
async fn test_remove_unknown_status_is_noop() {
    let mut h = harness(settings(vec![WatcherDeclaration {
        on_delete: vec![Action::RemoveStatus {
            id: "ghost".to_string(),
        }],
        ..Default::default()
    }]));
    let config = h.service.settings().clone();
    h.service.apply_settings(config);

    let delete = event(&h, FileEventKind::Deleted, "/proj/app.js");
    let report = h.service.handle_event(delete).unwrap().await.unwrap();

    assert_eq!(report, ExecutionReport { executed: 1, failed: 0 });
    assert!(h.ui.hidden.lock().is_empty());
    assert!(h.ui.errors.lock().is_empty());
}

#[tokio::test]
async fn test_reload_with_empty_config_disposes_everything() {
    let declarations = vec![ignore_editor_saves(), ignore_editor_saves()];
    let mut h = harness(settings(declarations));
    let config = h.service.settings().clone();
    h.service.apply_settings(config);
    assert_eq!(h.source.live(), 2);
    let stale = event(&h, FileEventKind::Changed, "/proj/app.js");

    let report = h.service.apply_settings(settings(Vec::new()));

    assert_eq!(report.active, 0);
    assert_eq!(h.source.live(), 0);
    assert_eq!(h.source.disposed(), 2);
    assert_eq!(h.service.registry().active_count(), 0);
    assert_eq!(h.service.registry().state(), RegistryState::Active);
    assert!(h.service.handle_event(stale).is_none());
}

#[tokio::test]
async fn test_invalid_settings_file_leaves_zero_watchers() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("settings.toml");
    std::fs::write(
        &path,
        "[[watchers]]\nonChange = [{ notify = \"a\", removeStatusBarItem = \"b\" }]\n",
    )
    .unwrap();

    let ui = Arc::new(RecordingUi::default());
    let source = FakeSource::default();
    let mut service = WatchService::builder()
        .settings(settings(vec![ignore_editor_saves()]))
        .settings_path(path)
        .ui(ui.clone())
        .documents(Arc::new(MemoryDocuments::default()))
        .source(source.clone())
        .build();
    let config = service.settings().clone();
    service.apply_settings(config);
    assert_eq!(source.live(), 1);

    let report = service.reload();

    assert_eq!(report.active, 0);
    assert_eq!(source.live(), 0);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(ui.errors.lock().len(), 1);
}

#[tokio::test]
async fn test_legacy_notify_declaration() {
    let config = Settings {
        notify: Some(WatcherDeclaration {
            on_create: vec![Action::Notify {
                message: "${relativeFile} created".to_string(),
                open_label: None,
            }],
            ..Default::default()
        }),
        ..settings(Vec::new())
    };
    let mut h = harness_with(config.clone(), RecordingUi::clicking_open(), MemoryDocuments::default());
    assert_eq!(h.service.apply_settings(config).active, 1);

    let create = event(&h, FileEventKind::Created, "/proj/src/new.js");
    h.service.handle_event(create).unwrap().await.unwrap();

    assert_eq!(
        *h.ui.notifications.lock(),
        vec![("src/new.js created".to_string(), "Open".to_string())]
    );
    assert_eq!(*h.documents.opened.lock(), vec![PathBuf::from("/proj/src/new.js")]);
}

#[tokio::test]
async fn test_auto_save_change_is_attributed_to_editor() {
    let declaration = WatcherDeclaration {
        on_create: vec![Action::AutoSave],
        ..ignore_editor_saves()
    };
    let config = settings(vec![declaration]);
    let mut h = harness_with(
        config.clone(),
        RecordingUi::default(),
        MemoryDocuments::default().with_file("/proj/app.js", "let x = 1;"),
    );
    h.service.apply_settings(config);

    let create = event(&h, FileEventKind::Created, "/proj/app.js");
    h.service.handle_event(create).unwrap().await.unwrap();
    assert_eq!(*h.documents.saved.lock(), vec![PathBuf::from("/proj/app.js")]);

    let change = event(&h, FileEventKind::Changed, "/proj/app.js");
    assert!(h.service.handle_event(change).is_none());
}

#[tokio::test]
async fn test_changes_are_debounced() {
    let mut config = settings(vec![WatcherDeclaration {
        on_change: vec![status("changed", "x")],
        ..Default::default()
    }]);
    config.debounce_ms = 20;
    let mut h = harness(config.clone());
    h.service.apply_settings(config);

    for _ in 0..3 {
        let change = event(&h, FileEventKind::Changed, "/proj/app.js");
        assert!(h.service.handle_event(change).is_none());
    }
    tokio::time::sleep(Duration::from_millis(40)).await;

    let handles = h.service.flush_ready();
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(h.ui.shown.lock().len(), 1);
}

#[tokio::test]
async fn test_delete_drops_pending_change() {
    let mut config = settings(vec![WatcherDeclaration {
        on_change: vec![status("changed", "x")],
        on_delete: vec![status("deleted", "x")],
        ..Default::default()
    }]);
    config.debounce_ms = 20;
    let mut h = harness(config.clone());
    h.service.apply_settings(config);

    let change = event(&h, FileEventKind::Changed, "/proj/app.js");
    assert!(h.service.handle_event(change).is_none());
    let delete = event(&h, FileEventKind::Deleted, "/proj/app.js");
    h.service.handle_event(delete).unwrap().await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(h.service.flush_ready().is_empty());
    assert_eq!(h.ui.shown_ids(), vec!["deleted".to_string()]);
}

#[tokio::test]
async fn test_run_loop_routes_source_events() {
    let config = settings(vec![WatcherDeclaration {
        glob_pattern: "*.ts".to_string(),
        on_create: vec![status("created", "${relativeFileDirname}")],
        ..Default::default()
    }]);
    let h = harness(config);
    let ui = h.ui.clone();
    let source = h.source.clone();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let driver = async move {
        assert!(eventually(|| source.live() == 1).await);
        assert_eq!(source.emit(FileEventKind::Created, "/proj/lib/a.js"), 0);
        assert_eq!(source.emit(FileEventKind::Created, "/proj/lib/a.ts"), 1);
        assert!(eventually(|| !ui.shown.lock().is_empty()).await);
        stop_tx.send(()).unwrap();
        ui
    };

    let (_, ui) = tokio::join!(
        h.service.run_until(async {
            stop_rx.await.ok();
        }),
        driver
    );

    assert_eq!(ui.shown.lock()[0].text, "lib");
    assert_eq!(h.source.live(), 0);
}
