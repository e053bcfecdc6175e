// ============================================================================
// spark-mvvm - Type Definitions
// Type-erased subscriber interface for the dependency graph
// ============================================================================

use std::any::Any;
use std::rc::Rc;

use crate::error::Result;
use crate::observer::Value;
use crate::primitives::scope::Scope;
use crate::reactivity::dep::Dep;

// =============================================================================
// TYPE-ERASED SUBSCRIBER
// =============================================================================
//
// A Dep only needs to know three things about whoever listens to it: an
// identity, how to accept a new dependency edge, and how to re-run. Keeping
// that behind a trait lets a Dep store Weak<dyn Subscriber> without knowing
// about watchers, and lets tests plug in recording subscribers.
// =============================================================================

/// Something that can be notified when a [`Dep`] it read from changes.
pub trait Subscriber: Any {
    /// Unique identity (used for duplicate suppression and removal)
    fn id(&self) -> u64;

    /// Record `dep` as a dependency and subscribe to it.
    ///
    /// Must be idempotent within one evaluation.
    fn add_dependency(&self, dep: &Rc<Dep>);

    /// Re-run after a dependency changed.
    fn update(&self) -> Result<()>;

    /// Upcast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// CALLBACKS
// =============================================================================

/// Change callback of a watcher: `(scope, new_value, old_value)`.
///
/// The scope is the watcher's owning context, the Rust stand-in for binding
/// the callback's receiver.
pub type WatchCallback = Box<dyn FnMut(&Scope, &Value, &Value) -> Result<()>>;
