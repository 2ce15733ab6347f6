//! Error types for placeholder resolution.

use std::path::PathBuf;
use thiserror::Error;

/// A placeholder that could not be resolved.
///
/// Never aborts an expansion: the placeholder is replaced by a fallback
/// token and the error is reported as a diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Variable ${{{variable}}} can not be resolved: no workspace folder is open")]
    NoWorkspace { variable: String },

    #[error(
        "Variable ${{{variable}}} is ambiguous with {count} workspace folders open; \
         use ${{workspaceFolder:NAME}} to pick one"
    )]
    AmbiguousWorkspace { variable: String, count: usize },

    #[error("No workspace folder named '{name}' is open")]
    UnknownFolder { name: String },

    #[error("Variable ${{{variable}}} needs a triggering file")]
    NoFileContext { variable: String },

    #[error("Variable ${{{variable}}}: {file} is not inside any workspace folder")]
    NoOwningFolder { variable: String, file: PathBuf },

    #[error("Variable ${{{variable}}}: {file} is not inside {folder}")]
    FileOutsideFolder {
        variable: String,
        file: PathBuf,
        folder: PathBuf,
    },
}
