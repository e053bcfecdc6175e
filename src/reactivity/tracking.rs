// ============================================================================
// spark-mvvm - Tracking Cursor
// Scoped installation of the "currently evaluating" subscriber
// ============================================================================
//
// Reads register themselves against whichever subscriber the cursor points
// at. The cursor is only ever installed through the guards below, so it is
// restored on every exit path: normal return, `?` early return, or panic.
// ============================================================================

use std::rc::Weak;

use crate::core::context::with_context;
use crate::core::types::Subscriber;

// =============================================================================
// WITH TRACKING
// =============================================================================

/// Run `f` with `subscriber` installed as the tracking cursor.
///
/// The previous cursor is restored when `f` returns (or unwinds), which
/// makes nested evaluation safe.
pub fn with_tracking<R>(subscriber: Weak<dyn Subscriber>, f: impl FnOnce() -> R) -> R {
    struct CursorGuard {
        prev: Option<Weak<dyn Subscriber>>,
        untracking: bool,
    }

    impl Drop for CursorGuard {
        fn drop(&mut self) {
            let prev = self.prev.take();
            let untracking = self.untracking;
            with_context(|ctx| {
                ctx.set_active_subscriber(prev);
                ctx.set_untracking(untracking);
            });
        }
    }

    let (prev, untracking) = with_context(|ctx| {
        (
            ctx.set_active_subscriber(Some(subscriber)),
            ctx.set_untracking(false),
        )
    });

    let _guard = CursorGuard {
        prev,
        untracking,
    };
    f()
}

// =============================================================================
// UNTRACK
// =============================================================================

/// Read reactive values without creating dependencies.
///
/// Used for reads that must not subscribe anybody, such as resolving event
/// arguments or comparing a bound value before a two-way write.
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    struct UntrackGuard {
        prev: bool,
    }

    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.set_untracking(self.prev));
        }
    }

    let prev = with_context(|ctx| ctx.set_untracking(true));
    let _guard = UntrackGuard { prev };
    f()
}

// =============================================================================
// TESTS
// =============================================================================
