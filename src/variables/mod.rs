//! `${...}` placeholder substitution.
//!
//! Templates from watcher declarations (root paths, notification messages,
//! status text) are resolved against the operating system, the open
//! workspace folders and the file that triggered an event.
//!
//! # Architecture
//!
//! ```text
//! Expander (fixed-point loop over the variable catalog)
//!     |
//!     | VariableLookup
//!     v
//! VariableResolver
//!   - Environment   (env vars, platform)
//!   - Workspace     (folders, owner lookup)
//!   - triggering file (optional)
//! ```

mod catalog;
mod environment;
mod error;
mod expander;
mod resolver;
mod workspace;

pub use catalog::Variable;
pub use environment::{Environment, Platform, StaticEnvironment, SystemEnvironment};
pub use error::ResolveError;
pub use expander::{Expander, Expansion, MAX_PASSES, VariableLookup, fallback_token};
pub use resolver::VariableResolver;
pub use workspace::{Workspace, WorkspaceFolder};
