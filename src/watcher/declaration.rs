//! Watcher declarations as written in the settings file.

use serde::{Deserialize, Serialize};

use super::event::{EventKinds, FileEventKind, SaveOrigin};
use crate::actions::Action;

fn default_glob() -> String {
    "*.js".to_string()
}

fn default_true() -> bool {
    true
}

/// One configured watch rule.
///
/// ```toml
/// [[watchers]]
/// path = "${workspaceFolder}/src"
/// globPattern = "**/*.ts"
/// triggerOnVSCodeSave = false
/// onChange = [
///     { notify = "${relativeFile} changed on disk", openLabel = "Show" },
///     { autoSave = true },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WatcherDeclaration {
    /// Root to watch; a template expanded once when the watcher is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "globPattern", default = "default_glob")]
    pub glob_pattern: String,

    /// Run `onChange` for saves made by the editor itself.
    #[serde(rename = "triggerOnVSCodeSave", default = "default_true")]
    pub trigger_on_editor_save: bool,

    /// Run `onChange` for writes made by anything else.
    #[serde(rename = "triggerOnExternalSave", default = "default_true")]
    pub trigger_on_external_save: bool,

    #[serde(rename = "onCreate", default, skip_serializing_if = "Vec::is_empty")]
    pub on_create: Vec<Action>,

    #[serde(rename = "onChange", default, skip_serializing_if = "Vec::is_empty")]
    pub on_change: Vec<Action>,

    #[serde(rename = "onDelete", default, skip_serializing_if = "Vec::is_empty")]
    pub on_delete: Vec<Action>,
}

impl Default for WatcherDeclaration {
    fn default() -> Self {
        Self {
            path: None,
            glob_pattern: default_glob(),
            trigger_on_editor_save: true,
            trigger_on_external_save: true,
            on_create: Vec::new(),
            on_change: Vec::new(),
            on_delete: Vec::new(),
        }
    }
}

impl WatcherDeclaration {
    pub fn actions_for(&self, kind: FileEventKind) -> &[Action] {
        match kind {
            FileEventKind::Created => &self.on_create,
            FileEventKind::Changed => &self.on_change,
            FileEventKind::Deleted => &self.on_delete,
        }
    }

    /// Event kinds that have at least one declared action.
    pub fn event_kinds(&self) -> EventKinds {
        FileEventKind::ALL
            .into_iter()
            .filter(|kind| !self.actions_for(*kind).is_empty())
            .fold(EventKinds::empty(), |kinds, kind| kinds | EventKinds::from(kind))
    }

    /// Whether a change with the given origin should run `onChange`.
    pub fn accepts(&self, origin: SaveOrigin) -> bool {
        match origin {
            SaveOrigin::Editor => self.trigger_on_editor_save,
            SaveOrigin::External => self.trigger_on_external_save,
        }
    }
}
