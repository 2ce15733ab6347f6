//! Filesystem-backed document host.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::{Document, DocumentHost, HostError};

/// Loads and saves files directly on disk.
///
/// Saves rewrite the file in place so watchers see a modification of the
/// existing file rather than a new one. Opening runs the configured editor
/// command with the file path appended.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentHost {
    open_command: Option<String>,
}

impl FsDocumentHost {
    pub fn new(open_command: Option<String>) -> Self {
        Self { open_command }
    }

    async fn write_in_place(path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentHost for FsDocumentHost {
    async fn load(&self, path: &Path) -> Result<Document, HostError> {
        let content = tokio::fs::read(path).await.map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Document {
            path: path.to_path_buf(),
            content,
        })
    }

    async fn save(&self, document: &Document) -> Result<(), HostError> {
        Self::write_in_place(&document.path, &document.content)
            .await
            .map_err(|e| HostError::Save {
                path: document.path.clone(),
                reason: e.to_string(),
            })?;

        crate::debug_event!("documents", "saved", "{}", document.path.display());
        Ok(())
    }

    async fn open(&self, path: &Path) -> Result<(), HostError> {
        let Some(command) = self.open_command.as_deref() else {
            crate::log_event!("documents", "no editor configured", "{}", path.display());
            return Ok(());
        };

        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(HostError::Open {
                path: path.to_path_buf(),
                reason: "editor.open_command is empty".to_string(),
            });
        };

        tokio::process::Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .map_err(|e| HostError::Open {
                path: path.to_path_buf(),
                reason: format!("{program}: {e}"),
            })?;

        crate::log_event!("documents", "opened", "{}", path.display());
        Ok(())
    }
}
