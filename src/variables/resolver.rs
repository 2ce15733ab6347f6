//! Values for the variable catalog.

use std::path::Path;

use super::catalog::Variable;
use super::environment::Environment;
use super::error::ResolveError;
use super::expander::{Expander, Expansion, VariableLookup};
use super::workspace::Workspace;

/// Resolves variables for one template against the environment, the open
/// workspace folders and an optional triggering file.
pub struct VariableResolver<'a> {
    env: &'a dyn Environment,
    workspace: &'a Workspace,
    file: Option<&'a Path>,
}

impl<'a> VariableResolver<'a> {
    /// Resolver without file context, e.g. for watcher root paths.
    pub fn new(env: &'a dyn Environment, workspace: &'a Workspace) -> Self {
        Self {
            env,
            workspace,
            file: None,
        }
    }

    /// Attach the file that triggered the event.
    pub fn with_file(mut self, file: &'a Path) -> Self {
        self.file = Some(file);
        self
    }

    /// Expand `template` with the shared expander.
    pub fn expand(&self, template: &str) -> Expansion {
        Expander::global().expand(template, self)
    }

    fn file(&self, variable: Variable) -> Result<&'a Path, ResolveError> {
        self.file.ok_or_else(|| ResolveError::NoFileContext {
            variable: variable.name().to_string(),
        })
    }

    /// Path of `target` relative to the folder owning the triggering file.
    fn relative_to_folder(
        &self,
        variable: Variable,
        file: &Path,
        target: &Path,
    ) -> Result<String, ResolveError> {
        let folder = self.workspace.resolve_for(variable.name(), Some(file))?;
        let relative = target
            .strip_prefix(&folder.root)
            .map_err(|_| ResolveError::FileOutsideFolder {
                variable: variable.name().to_string(),
                file: file.to_path_buf(),
                folder: folder.root.clone(),
            })?;

        if relative.as_os_str().is_empty() {
            Ok(".".to_string())
        } else {
            Ok(relative.display().to_string())
        }
    }
}

impl VariableLookup for VariableResolver<'_> {
    fn lookup(&self, variable: Variable, argument: Option<&str>) -> Result<String, ResolveError> {
        let platform = self.env.platform();

        match variable {
            Variable::PathSeparator => Ok(platform.path_separator().to_string()),
            Variable::UserHome => Ok(format!("${{env:{}}}", platform.home_variable())),
            Variable::Env => Ok(argument.and_then(|name| self.env.var(name)).unwrap_or_default()),
            Variable::WorkspaceFolderNamed => {
                let name = argument.unwrap_or_default();
                self.workspace
                    .by_name(name)
                    .map(|f| f.root.display().to_string())
                    .ok_or_else(|| ResolveError::UnknownFolder {
                        name: name.to_string(),
                    })
            }
            Variable::WorkspaceFolder => self
                .workspace
                .resolve_for(variable.name(), self.file)
                .map(|f| f.root.display().to_string()),
            Variable::WorkspaceFolderBasename => self
                .workspace
                .resolve_for(variable.name(), self.file)
                .map(|f| f.basename()),
            Variable::File => Ok(self.file(variable)?.display().to_string()),
            Variable::RelativeFile => {
                let file = self.file(variable)?;
                self.relative_to_folder(variable, file, file)
            }
            Variable::RelativeFileDirname => {
                let file = self.file(variable)?;
                let dir = file.parent().unwrap_or(file);
                self.relative_to_folder(variable, file, dir)
            }
            Variable::FileBasename => Ok(self
                .file(variable)?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()),
            Variable::FileBasenameNoExtension => Ok(self
                .file(variable)?
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()),
            Variable::FileExtname => Ok(self
                .file(variable)?
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default()),
            Variable::FileDirname => Ok(self
                .file(variable)?
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
        }
    }
}
