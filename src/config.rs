//! Layered settings for the watcher daemon.
//!
//! Sources, later ones winning:
//! - Built-in defaults
//! - `.fwatch/settings.toml` in the workspace (found by walking up from
//!   the current directory)
//! - Environment variables
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `FWATCH_` and use double
//! underscores to separate nested levels:
//! - `FWATCH_SAVE_TRACKING__WINDOW_MS=750` sets `save_tracking.window_ms`
//! - `FWATCH_LOGGING__DEFAULT=debug` sets `logging.default`
//! - `FWATCH_PLATFORM=windows` sets `platform`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::variables::{Platform, Workspace, WorkspaceFolder};
use crate::watcher::{DEFAULT_SAVE_WINDOW_MS, WatcherDeclaration};

/// Directory holding the settings file, relative to the workspace root.
pub const CONFIG_DIR: &str = ".fwatch";
/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

const ENV_PREFIX: &str = "FWATCH_";

/// Errors from loading or writing settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("Configuration file already exists at {path}. Use --force to overwrite")]
    AlreadyExists { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .fwatch is located)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Path conventions used by `${pathSeparator}` and `${userHome}`
    #[serde(default)]
    pub platform: Platform,

    /// How often the settings file is checked for edits
    #[serde(default = "default_config_poll_ms")]
    pub config_poll_ms: u64,

    /// Quiet period before a burst of change events is dispatched; 0 disables
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Watcher declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watchers: Vec<WatcherDeclaration>,

    /// Single legacy declaration, used only when `watchers` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<WatcherDeclaration>,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub save_tracking: SaveTrackingConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Open workspace folders. Empty means one folder at the workspace root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<FolderConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FolderConfig {
    /// Display name; defaults to the last path segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Folder root, relative paths resolve against the workspace root
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SaveTrackingConfig {
    /// How long after an editor save a change counts as internal
    #[serde(default = "default_save_window_ms")]
    pub window_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorConfig {
    /// Program used to open a file, e.g. `"code --reuse-window"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Level for everything not listed in `modules`
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target levels, e.g. `"fwatch::watcher" = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_config_poll_ms() -> u64 {
    1000
}
fn default_debounce_ms() -> u64 {
    50
}
fn default_save_window_ms() -> u64 {
    DEFAULT_SAVE_WINDOW_MS
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            platform: Platform::default(),
            config_poll_ms: default_config_poll_ms(),
            debounce_ms: default_debounce_ms(),
            watchers: Vec::new(),
            notify: None,
            workspace: WorkspaceConfig::default(),
            save_tracking: SaveTrackingConfig::default(),
            editor: EditorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SaveTrackingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_save_window_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

const DEFAULT_TEMPLATE: &str = r#"# fwatch settings
version = 1

# Milliseconds a file must be quiet before onChange runs (0 disables).
debounce_ms = 50

# Milliseconds between checks of this file for edits.
config_poll_ms = 1000

[save_tracking]
# Changes seen within this many milliseconds of an editor save are
# treated as internal (see triggerOnVSCodeSave).
window_ms = 500

[editor]
# Program used to open a file from a notification.
# open_command = "code --reuse-window"

[logging]
default = "warn"

# Extra workspace folders. Without any, the workspace root is the only one.
# [[workspace.folders]]
# name = "web"
# path = "packages/web"

# [[watchers]]
# path = "${workspaceFolder}/src"
# globPattern = "**/*.js"
# triggerOnVSCodeSave = false
# onChange = [
#     { showStatusBarItem = "js", text = "${fileBasename} changed", tooltip = "${relativeFile}" },
#     { notify = "${relativeFile} was changed outside the editor", openLabel = "Open" },
# ]
# onDelete = [{ removeStatusBarItem = "js" }]
"#;

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::layered(path.as_ref(), ENV_PREFIX)
    }

    fn layered(path: &Path, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nested levels; single underscores
            // stay inside field names.
            .merge(
                Env::prefixed(env_prefix)
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(Box::new)?;

        if settings.workspace_root.is_none() {
            settings.workspace_root = Self::root_for_config(path);
        }
        Ok(settings)
    }

    /// Workspace root implied by a settings file location.
    fn root_for_config(path: &Path) -> Option<PathBuf> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().ok()?.join(path)
        };
        let dir = path.parent()?;
        if dir.file_name().is_some_and(|name| name == CONFIG_DIR) {
            dir.parent().map(Path::to_path_buf)
        } else {
            Some(dir.to_path_buf())
        }
    }

    /// Find the settings file by looking for a .fwatch directory from the
    /// current directory up to the filesystem root.
    pub fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .fwatch is located).
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Settings file in use: the workspace one if found, else
    /// `.fwatch/settings.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        Self::find_workspace_config().unwrap_or_else(|| Path::new(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let toml_string = toml::to_string_pretty(self)?;
        write_file(path, &toml_string)
    }

    /// Create a commented default settings file in the current directory.
    pub fn init_config_file(force: bool) -> Result<PathBuf, ConfigError> {
        let config_path = Path::new(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(ConfigError::AlreadyExists { path: config_path });
        }

        write_file(&config_path, DEFAULT_TEMPLATE)?;
        Ok(config_path)
    }

    /// Declarations to activate: `watchers`, or the legacy `notify` block
    /// when that list is empty.
    pub fn declarations(&self) -> &[WatcherDeclaration] {
        if !self.watchers.is_empty() {
            return &self.watchers;
        }
        match &self.notify {
            Some(legacy) => std::slice::from_ref(legacy),
            None => &[],
        }
    }

    /// Open workspace folders.
    ///
    /// Without configured folders the workspace root is the single folder.
    /// With no root known either, the workspace is empty.
    pub fn workspace(&self) -> Workspace {
        let root = self
            .workspace_root
            .clone()
            .or_else(|| std::env::current_dir().ok());

        if self.workspace.folders.is_empty() {
            return Workspace::new(root.map(WorkspaceFolder::from_root).into_iter().collect());
        }

        let folders = self
            .workspace
            .folders
            .iter()
            .map(|folder| {
                let path = match &root {
                    Some(root) if folder.path.is_relative() => normalize(&root.join(&folder.path)),
                    _ => folder.path.clone(),
                };
                match &folder.name {
                    Some(name) => WorkspaceFolder::new(name.clone(), path),
                    None => WorkspaceFolder::from_root(path),
                }
            })
            .collect();
        Workspace::new(folders)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write().map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Drop `.` components so `root/.` names the root itself.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
