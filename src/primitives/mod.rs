// ============================================================================
// spark-mvvm - Primitives Module
// Paths, scopes and watchers
// ============================================================================

pub mod path;
pub mod scope;
pub mod watcher;

pub use path::{Path, Segment};
pub use scope::Scope;
pub use watcher::{Watcher, WatcherInner};
