pub mod actions;
pub mod cli;
pub mod config;
pub mod host;
pub mod logging;
pub mod state;
pub mod variables;
pub mod watcher;

pub use actions::{Action, ActionExecutor, StatusIndicatorCache, StatusItem, StatusUpdate};
pub use config::{ConfigError, Settings};
pub use host::{DocumentHost, HostError, Ui};
pub use state::SharedState;
pub use variables::{Environment, Expander, ResolveError, VariableResolver, Workspace};
pub use watcher::{SaveOriginTracker, WatchError, WatchService, WatcherDeclaration, WatcherRegistry};
