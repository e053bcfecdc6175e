// ============================================================================
// spark-mvvm - Dep
// A tracked slot: the set of subscribers interested in one property
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::context::with_context;
use crate::core::types::Subscriber;
use crate::error::Result;

// =============================================================================
// DEP
// =============================================================================

/// Subscriber registry of one tracked property (or of a whole container).
///
/// Subscribers are held weakly: a watcher stays subscribed for as long as
/// somebody owns it, and dead entries are pruned on the next notify.
pub struct Dep {
    id: u64,
    subs: RefCell<Vec<Weak<dyn Subscriber>>>,
}

impl Dep {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: with_context(|ctx| ctx.next_dep_id()),
            subs: RefCell::new(Vec::new()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subs
            .borrow()
            .iter()
            .filter(|sub| sub.strong_count() > 0)
            .count()
    }

    /// Append a subscriber unless it is already present.
    pub fn add_subscriber(&self, sub: Weak<dyn Subscriber>) {
        let Some(candidate) = sub.upgrade() else {
            return;
        };
        let id = candidate.id();

        let mut subs = self.subs.borrow_mut();
        let present = subs
            .iter()
            .filter_map(Weak::upgrade)
            .any(|existing| existing.id() == id);
        if !present {
            tracing::trace!(dep = self.id, subscriber = id, "dep.add_subscriber");
            subs.push(sub);
        }
    }

    /// Remove a subscriber by identity. No-op if absent.
    pub fn remove_subscriber(&self, id: u64) {
        self.subs
            .borrow_mut()
            .retain(|sub| sub.upgrade().is_some_and(|s| s.id() != id));
    }

    /// Register the active subscriber (if any) against this dep.
    ///
    /// The subscriber records the dep and subscribes itself, so one call
    /// creates both directions of the edge.
    pub fn depend(self: &Rc<Self>) {
        let active = with_context(|ctx| {
            if ctx.is_untracking() {
                None
            } else {
                ctx.get_active_subscriber()
            }
        });

        if let Some(subscriber) = active.and_then(|weak| weak.upgrade()) {
            subscriber.add_dependency(self);
        }
    }

    /// Run `update()` on every subscriber, in subscription order.
    ///
    /// Iterates a snapshot so subscribers may subscribe or unsubscribe
    /// while being notified. Stops at the first failing update.
    pub fn notify(&self) -> Result<()> {
        // Collect first, then release the borrow before running updates
        let snapshot: Vec<Rc<dyn Subscriber>> = {
            let mut subs = self.subs.borrow_mut();
            subs.retain(|sub| sub.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(dep = self.id, subscribers = snapshot.len(), "dep.notify");

        for sub in snapshot {
            sub.update()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::Cell;

    use crate::reactivity::tracking::with_tracking;

    /// Subscriber that records updates into a shared log
    struct Recorder {
        id: u64,
        log: Rc<RefCell<Vec<u64>>>,
        deps: RefCell<Vec<Rc<Dep>>>,
        me: RefCell<Weak<Recorder>>,
        unsubscribe_on_update: Cell<bool>,
    }

    impl Recorder {
        fn new(log: &Rc<RefCell<Vec<u64>>>) -> Rc<Self> {
            let rec = Rc::new(Self {
                id: with_context(|ctx| ctx.next_subscriber_id()),
                log: log.clone(),
                deps: RefCell::new(Vec::new()),
                me: RefCell::new(Weak::new()),
                unsubscribe_on_update: Cell::new(false),
            });
            *rec.me.borrow_mut() = Rc::downgrade(&rec);
            rec
        }

        fn weak(self: &Rc<Self>) -> Weak<dyn Subscriber> {
            Rc::downgrade(&(self.clone() as Rc<dyn Subscriber>))
        }
    }

    impl Subscriber for Recorder {
        fn id(&self) -> u64 {
            self.id
        }

        fn add_dependency(&self, dep: &Rc<Dep>) {
            self.deps.borrow_mut().push(dep.clone());
            if let Some(me) = self.me.borrow().upgrade() {
                dep.add_subscriber(me.weak());
            }
        }

        fn update(&self) -> Result<()> {
            self.log.borrow_mut().push(self.id);
            if self.unsubscribe_on_update.get() {
                for dep in self.deps.borrow().iter() {
                    dep.remove_subscriber(self.id);
                }
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn add_subscriber_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let rec = Recorder::new(&log);

        dep.add_subscriber(rec.weak());
        dep.add_subscriber(rec.weak());
        assert_eq!(dep.subscriber_count(), 1);

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec![rec.id]);
    }

    #[test]
    fn remove_subscriber_by_identity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let a = Recorder::new(&log);
        let b = Recorder::new(&log);

        dep.add_subscriber(a.weak());
        dep.add_subscriber(b.weak());
        dep.remove_subscriber(a.id);
        dep.remove_subscriber(999_999);

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec![b.id]);
    }

    #[test]
    fn notify_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let subs: Vec<_> = (0..4).map(|_| Recorder::new(&log)).collect();
        for sub in &subs {
            dep.add_subscriber(sub.weak());
        }

        dep.notify().unwrap();
        let expected: Vec<u64> = subs.iter().map(|s| s.id).collect();
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn self_removal_during_notify_skips_nobody() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let a = Recorder::new(&log);
        let b = Recorder::new(&log);
        let c = Recorder::new(&log);

        for rec in [&a, &b, &c] {
            let rec: &Rc<Recorder> = rec;
            with_tracking(rec.weak(), || dep.depend());
        }
        a.unsubscribe_on_update.set(true);

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec![a.id, b.id, c.id]);

        log.borrow_mut().clear();
        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec![b.id, c.id]);
    }

    #[test]
    fn depend_without_cursor_is_noop() {
        let dep = Dep::new();
        dep.depend();
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        {
            let rec = Recorder::new(&log);
            dep.add_subscriber(rec.weak());
            assert_eq!(dep.subscriber_count(), 1);
        }
        assert_eq!(dep.subscriber_count(), 0);
        dep.notify().unwrap();
        assert!(log.borrow().is_empty());
    }
}
