//! Recording collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use fwatch::actions::StatusItem;
use fwatch::host::{Document, DocumentHost, HostError, NotificationResponse, Ui};
use fwatch::watcher::{
    EventKinds, EventSink, EventSource, FileEventKind, Subscription, WatchError, WatchScope,
};

/// UI double that records every call.
#[derive(Default)]
pub struct RecordingUi {
    pub shown: Mutex<Vec<StatusItem>>,
    pub hidden: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<(String, String)>>,
    pub errors: Mutex<Vec<String>>,
    pub click_open: bool,
}

impl RecordingUi {
    pub fn clicking_open() -> Self {
        Self {
            click_open: true,
            ..Default::default()
        }
    }

    pub fn shown_ids(&self) -> Vec<String> {
        self.shown.lock().iter().map(|item| item.id.clone()).collect()
    }
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
        self.notifications
            .lock()
            .push((message.to_string(), open_label.to_string()));
        if self.click_open {
            NotificationResponse::Opened
        } else {
            NotificationResponse::Dismissed
        }
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// In-memory documents.
#[derive(Default)]
pub struct MemoryDocuments {
    pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    pub saved: Mutex<Vec<PathBuf>>,
    pub opened: Mutex<Vec<PathBuf>>,
}

impl MemoryDocuments {
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.lock().insert(path.into(), content.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl DocumentHost for MemoryDocuments {
    async fn load(&self, path: &Path) -> Result<Document, HostError> {
        let content = self.files.lock().get(path).cloned();
        match content {
            Some(content) => Ok(Document {
                path: path.to_path_buf(),
                content,
            }),
            None => Err(HostError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    async fn save(&self, document: &Document) -> Result<(), HostError> {
        self.files
            .lock()
            .insert(document.path.clone(), document.content.clone());
        self.saved.lock().push(document.path.clone());
        Ok(())
    }

    async fn open(&self, path: &Path) -> Result<(), HostError> {
        self.opened.lock().push(path.to_path_buf());
        Ok(())
    }
}

struct FakeSubscriptionState {
    scope: WatchScope,
    kinds: EventKinds,
    sink: EventSink,
    live: bool,
}

/// Event source whose events are injected by the test.
#[derive(Clone, Default)]
pub struct FakeSource {
    subscriptions: Arc<Mutex<Vec<FakeSubscriptionState>>>,
}

struct FakeSubscription {
    subscriptions: Arc<Mutex<Vec<FakeSubscriptionState>>>,
    index: usize,
}

impl Subscription for FakeSubscription {
    fn dispose(&mut self) {
        if let Some(state) = self.subscriptions.lock().get_mut(self.index) {
            state.live = false;
        }
    }
}

impl EventSource for FakeSource {
    fn subscribe(
        &self,
        scope: &WatchScope,
        kinds: EventKinds,
        sink: EventSink,
    ) -> Result<Box<dyn Subscription>, WatchError> {
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(FakeSubscriptionState {
            scope: scope.clone(),
            kinds,
            sink,
            live: true,
        });
        Ok(Box::new(FakeSubscription {
            subscriptions: self.subscriptions.clone(),
            index: subscriptions.len() - 1,
        }))
    }
}

impl FakeSource {
    /// Live subscriptions.
    pub fn live(&self) -> usize {
        self.subscriptions.lock().iter().filter(|s| s.live).count()
    }

    /// Subscriptions ever disposed.
    pub fn disposed(&self) -> usize {
        self.subscriptions.lock().iter().filter(|s| !s.live).count()
    }

    /// Deliver an event to every live subscription that observes it.
    /// Returns how many received it.
    pub fn emit(&self, kind: FileEventKind, path: &str) -> usize {
        let subscriptions = self.subscriptions.lock();
        subscriptions
            .iter()
            .filter(|s| s.live && s.kinds.contains(EventKinds::from(kind)))
            .filter(|s| s.scope.matches(Path::new(path)))
            .filter(|s| s.sink.emit(kind, PathBuf::from(path)))
            .count()
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
