//! File watching and event dispatch.
//!
//! # Architecture
//!
//! ```text
//! settings.toml --(ConfigReloadWatcher)--> WatchService::reload
//!                                               |
//!                                        WatcherRegistry
//!                             teardown all, then subscribe per declaration
//!                                               |
//!   EventSource (notify) --FileEvent{generation}--> channel
//!                                               |
//!                      Debouncer (changes) -> registry.dispatch
//!                                               |  stale generation? kind declared?
//!                                               |  SaveOriginTracker vs trigger flags
//!                                               v
//!                                   ActionExecutor (spawned task)
//! ```

mod config_reload;
mod debouncer;
mod declaration;
mod error;
mod event;
mod registry;
mod save_tracker;
mod service;
mod source;

pub use config_reload::ConfigReloadWatcher;
pub use debouncer::Debouncer;
pub use declaration::WatcherDeclaration;
pub use error::WatchError;
pub use event::{EventKinds, FileEvent, FileEventKind, SaveOrigin};
pub use registry::{Dispatch, RegistryState, ReloadReport, WatcherRegistry, resolve_scope};
pub use save_tracker::{DEFAULT_SAVE_WINDOW_MS, SaveOriginTracker};
pub use service::{WatchService, WatchServiceBuilder};
pub use source::{
    EventSink, EventSource, NotifyEventSource, Subscription, WatchScope, classify,
};
