// ============================================================================
// spark-mvvm - Reactive Data Binding for Rust
// ============================================================================
//
// Observed data (ReactiveObject / ReactiveArray) records which watchers read
// it and notifies them synchronously on every write. Watchers bind a path to
// a callback. The compiler walks a host tree and turns directives and
// interpolation markers into watchers that keep the tree in sync.
// ============================================================================

pub mod compiler;
pub mod core;
pub mod error;
pub mod observer;
pub mod primitives;
pub mod reactivity;
pub mod vm;

mod macros;

// Re-export core items at crate root for ergonomic access
pub use crate::core::constants;
pub use crate::core::context::{is_tracking, is_untracking, with_context, ReactiveContext};
pub use crate::core::types::{Subscriber, WatchCallback};

pub use error::{BindError, Result};

pub use observer::{compare_values, observe, ReactiveArray, ReactiveObject, Value};

pub use primitives::path::{Path, Segment};
pub use primitives::scope::Scope;
pub use primitives::watcher::{Watcher, WatcherInner};

pub use reactivity::dep::Dep;
pub use reactivity::equality::{loose_equals, strict_equals, EqualsFn};
pub use reactivity::tracking::{untrack, with_tracking};

pub use compiler::dom::{Event, Node, NodeKind};
pub use compiler::{CompileConfig, Compiler, MethodRegistry, UpdaterRegistry, View};

pub use vm::{Vm, VmBuilder};

// =============================================================================
// TESTS
// =============================================================================
