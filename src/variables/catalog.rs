//! The fixed catalog of recognized variables.

/// A recognized `${...}` variable.
///
/// Declaration order in [`Variable::ALL`] is the expansion priority:
/// environment-independent path/home/env variables run before the
/// workspace and file-derived ones, so that placeholders re-emitted by an
/// earlier variable (`${userHome}` becomes `${env:HOME}`) are picked up
/// within the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    PathSeparator,
    UserHome,
    Env,
    WorkspaceFolderNamed,
    WorkspaceFolder,
    WorkspaceFolderBasename,
    File,
    RelativeFile,
    RelativeFileDirname,
    FileBasename,
    FileBasenameNoExtension,
    FileExtname,
    FileDirname,
}

impl Variable {
    /// Every variable, in expansion priority order.
    pub const ALL: [Variable; 13] = [
        Variable::PathSeparator,
        Variable::UserHome,
        Variable::Env,
        Variable::WorkspaceFolderNamed,
        Variable::WorkspaceFolder,
        Variable::WorkspaceFolderBasename,
        Variable::File,
        Variable::RelativeFile,
        Variable::RelativeFileDirname,
        Variable::FileBasename,
        Variable::FileBasenameNoExtension,
        Variable::FileExtname,
        Variable::FileDirname,
    ];

    /// Variable name as written inside `${...}`.
    pub fn name(self) -> &'static str {
        match self {
            Variable::PathSeparator => "pathSeparator",
            Variable::UserHome => "userHome",
            Variable::Env => "env",
            Variable::WorkspaceFolderNamed | Variable::WorkspaceFolder => "workspaceFolder",
            Variable::WorkspaceFolderBasename => "workspaceFolderBasename",
            Variable::File => "file",
            Variable::RelativeFile => "relativeFile",
            Variable::RelativeFileDirname => "relativeFileDirname",
            Variable::FileBasename => "fileBasename",
            Variable::FileBasenameNoExtension => "fileBasenameNoExtension",
            Variable::FileExtname => "fileExtname",
            Variable::FileDirname => "fileDirname",
        }
    }

    /// Whether the variable takes a `:argument`.
    pub fn takes_argument(self) -> bool {
        matches!(self, Variable::Env | Variable::WorkspaceFolderNamed)
    }

    /// Whether the variable can only be resolved with a triggering file.
    pub fn needs_file(self) -> bool {
        matches!(
            self,
            Variable::File
                | Variable::RelativeFile
                | Variable::RelativeFileDirname
                | Variable::FileBasename
                | Variable::FileBasenameNoExtension
                | Variable::FileExtname
                | Variable::FileDirname
        )
    }

    /// Regex matching one occurrence of this variable.
    ///
    /// Arguments may not contain braces, so an inner placeholder such as
    /// `${env:${env:NAME}}` resolves first and the outer one matches on a
    /// later pass.
    pub(crate) fn pattern(self) -> String {
        let name = regex::escape(self.name());
        match self {
            Variable::Env => format!(r"\$\{{{name}:([^{{}}]*)\}}"),
            Variable::WorkspaceFolderNamed => format!(r"\$\{{{name}:([^{{}}]+)\}}"),
            _ => format!(r"\$\{{{name}\}}"),
        }
    }
}
