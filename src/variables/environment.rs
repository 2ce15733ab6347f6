//! Process environment access for variable resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Path conventions used by `${pathSeparator}` and `${userHome}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// Platform of the running binary.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn path_separator(self) -> char {
        match self {
            Platform::Posix => '/',
            Platform::Windows => '\\',
        }
    }

    /// Environment variable holding the user's home directory.
    pub fn home_variable(self) -> &'static str {
        match self {
            Platform::Posix => "HOME",
            Platform::Windows => "USERPROFILE",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// Read-only view of environment variables and platform conventions.
pub trait Environment: Send + Sync {
    /// Value of environment variable `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    fn platform(&self) -> Platform;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment {
    platform: Platform,
}

impl SystemEnvironment {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
    platform: Platform,
}

impl StaticEnvironment {
    pub fn new(platform: Platform) -> Self {
        Self {
            vars: HashMap::new(),
            platform,
        }
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
