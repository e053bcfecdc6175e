// ============================================================================
// spark-mvvm - Core Module
// Constants, the subscriber trait and the thread-local tracking context
// ============================================================================

pub mod constants;
pub mod context;
pub mod types;

pub use constants::*;
pub use context::{is_tracking, is_untracking, with_context, ReactiveContext};
pub use types::{Subscriber, WatchCallback};
