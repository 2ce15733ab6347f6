//! Collaborators that actions reach out to.
//!
//! [`Ui`] renders status indicators, notifications and diagnostics;
//! [`DocumentHost`] loads, saves and opens files. The daemon uses
//! [`ConsoleUi`] and [`FsDocumentHost`]; tests plug in recording doubles.

mod console;
mod fs;

pub use console::ConsoleUi;
pub use fs::FsDocumentHost;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::actions::StatusItem;

/// Errors from document and UI collaborators.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save {path}: {reason}")]
    Save { path: PathBuf, reason: String },

    #[error("Failed to open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
}

/// How the user answered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationResponse {
    /// The open affordance was activated.
    Opened,
    /// The notification was closed or timed out.
    Dismissed,
}

/// File content as loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// Surfaces status indicators, notifications and diagnostics to the user.
#[async_trait]
pub trait Ui: Send + Sync {
    /// Render (or re-render) a visible status indicator.
    fn show_status(&self, item: &StatusItem);

    /// Hide a status indicator that is being discarded.
    fn hide_status(&self, id: &str);

    /// Show a notification with one open affordance and wait for the answer.
    async fn notify(&self, message: &str, open_label: &str) -> NotificationResponse;

    /// Report a diagnostic or failure.
    fn show_error(&self, message: &str);
}

/// Loads, saves and opens documents.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Read the current on-disk content of `path`.
    async fn load(&self, path: &Path) -> Result<Document, HostError>;

    /// Persist `document` through the save pipeline.
    async fn save(&self, document: &Document) -> Result<(), HostError>;

    /// Open `path` for editing.
    async fn open(&self, path: &Path) -> Result<(), HostError>;
}
