//! Open workspace folders and file ownership lookup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ResolveError;

/// One root of the open project set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    pub name: String,
    pub root: PathBuf,
}

impl WorkspaceFolder {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Folder named after the last segment of its root.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Self { name, root }
    }

    /// Last path segment of the root.
    pub fn basename(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// The set of open workspace folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    folders: Vec<WorkspaceFolder>,
}

impl Workspace {
    pub fn new(folders: Vec<WorkspaceFolder>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[WorkspaceFolder] {
        &self.folders
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Find a folder by exact name, or by root path suffix when `name`
    /// contains a path separator.
    pub fn by_name(&self, name: &str) -> Option<&WorkspaceFolder> {
        if let Some(folder) = self.folders.iter().find(|f| f.name == name) {
            return Some(folder);
        }

        if !name.contains(['/', '\\']) {
            return None;
        }

        let suffix = name.trim_matches(['/', '\\']).replace('\\', "/");
        if suffix.is_empty() {
            return None;
        }
        let suffix = Path::new(&suffix);
        self.folders.iter().find(|f| f.root.ends_with(suffix))
    }

    /// The folder whose root contains `file`; the deepest root wins.
    pub fn owner_of(&self, file: &Path) -> Option<&WorkspaceFolder> {
        self.folders
            .iter()
            .filter(|f| f.contains(file))
            .max_by_key(|f| f.root.components().count())
    }

    /// Pick the folder a folder-owning variable refers to.
    ///
    /// One open folder is always used. With several open, a file is
    /// needed to pick the one that contains it.
    pub fn resolve_for(
        &self,
        variable: &str,
        file: Option<&Path>,
    ) -> Result<&WorkspaceFolder, ResolveError> {
        match self.folders.as_slice() {
            [] => Err(ResolveError::NoWorkspace {
                variable: variable.to_string(),
            }),
            [only] => Ok(only),
            many => {
                let Some(file) = file else {
                    return Err(ResolveError::AmbiguousWorkspace {
                        variable: variable.to_string(),
                        count: many.len(),
                    });
                };
                self.owner_of(file).ok_or_else(|| ResolveError::NoOwningFolder {
                    variable: variable.to_string(),
                    file: file.to_path_buf(),
                })
            }
        }
    }
}
