// ============================================================================
// spark-mvvm - Reactive Context
// Thread-local state holding the tracking cursor
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use super::types::Subscriber;

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Thread-local reactive context holding the only cross-cutting mutable
/// state of the engine.
///
/// The cursor is never set directly by reads or writes. It is set by
/// [`with_tracking`](crate::reactivity::tracking::with_tracking), which
/// restores the previous cursor when its guard drops.
pub struct ReactiveContext {
    /// Subscriber currently evaluating (the tracking cursor)
    pub active_subscriber: RefCell<Option<Weak<dyn Subscriber>>>,

    /// Whether reads are currently untracked
    pub untracking: Cell<bool>,

    /// Next dependency id
    next_dep_id: Cell<u64>,

    /// Next subscriber id
    next_subscriber_id: Cell<u64>,
}

impl ReactiveContext {
    pub fn new() -> Self {
        Self {
            active_subscriber: RefCell::new(None),
            untracking: Cell::new(false),
            next_dep_id: Cell::new(0),
            next_subscriber_id: Cell::new(0),
        }
    }

    // =========================================================================
    // TRACKING CURSOR
    // =========================================================================

    /// Set the active subscriber, returning the previous one
    pub fn set_active_subscriber(
        &self,
        subscriber: Option<Weak<dyn Subscriber>>,
    ) -> Option<Weak<dyn Subscriber>> {
        self.active_subscriber.replace(subscriber)
    }

    pub fn get_active_subscriber(&self) -> Option<Weak<dyn Subscriber>> {
        self.active_subscriber.borrow().clone()
    }

    pub fn has_active_subscriber(&self) -> bool {
        self.active_subscriber.borrow().is_some()
    }

    /// Set untracking mode, returning previous value
    pub fn set_untracking(&self, value: bool) -> bool {
        self.untracking.replace(value)
    }

    pub fn is_untracking(&self) -> bool {
        self.untracking.get()
    }

    // =========================================================================
    // IDENTITIES
    // =========================================================================

    pub fn next_dep_id(&self) -> u64 {
        let id = self.next_dep_id.get();
        self.next_dep_id.set(id + 1);
        id
    }

    pub fn next_subscriber_id(&self) -> u64 {
        let id = self.next_subscriber_id.get();
        self.next_subscriber_id.set(id + 1);
        id
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Check if reads currently register dependencies
pub fn is_tracking() -> bool {
    with_context(|ctx| ctx.has_active_subscriber() && !ctx.is_untracking())
}

pub fn is_untracking() -> bool {
    with_context(|ctx| ctx.is_untracking())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_starts_idle() {
        with_context(|ctx| {
            assert!(!ctx.has_active_subscriber());
            assert!(!ctx.is_untracking());
        });
        assert!(!is_tracking());
    }

    #[test]
    fn ids_are_unique() {
        let (a, b) = with_context(|ctx| (ctx.next_dep_id(), ctx.next_dep_id()));
        assert_ne!(a, b);

        let (a, b) = with_context(|ctx| (ctx.next_subscriber_id(), ctx.next_subscriber_id()));
        assert_ne!(a, b);
    }

    #[test]
    fn untracking_flag() {
        with_context(|ctx| {
            let prev = ctx.set_untracking(true);
            assert!(!prev);
            assert!(ctx.is_untracking());
            ctx.set_untracking(prev);
        });
        assert!(!is_untracking());
    }
}
