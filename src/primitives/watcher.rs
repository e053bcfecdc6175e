// ============================================================================
// spark-mvvm - Watcher
// An expression bound to a change callback
// ============================================================================
//
// A watcher owns a precompiled path and the scope it resolves against.
// Evaluating installs the watcher as the tracking cursor, so every tracked
// reader touched along the path subscribes it. Each evaluation rebuilds the
// dependency set: deps read last time but not this time are unsubscribed.
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use super::path::Path;
use super::scope::Scope;
use crate::core::constants::*;
use crate::core::context::with_context;
use crate::core::types::{Subscriber, WatchCallback};
use crate::error::Result;
use crate::observer::Value;
use crate::reactivity::dep::Dep;
use crate::reactivity::equality::strict_equals;
use crate::reactivity::tracking::with_tracking;

// =============================================================================
// WATCHER INNER
// =============================================================================

pub struct WatcherInner {
    id: u64,

    /// IDLE / EVALUATING plus CALLBACK_RUNNING
    flags: Cell<u32>,

    scope: Scope,
    path: Path,

    /// Taken out while running so the callback may touch this watcher
    callback: RefCell<Option<WatchCallback>>,

    last_value: RefCell<Value>,

    /// `(new, old)` changes waiting for the running callback
    pending: RefCell<VecDeque<(Value, Value)>>,

    /// Ids of the deps read by the current evaluation
    dep_ids: RefCell<HashSet<u64>>,
    deps: RefCell<Vec<Rc<Dep>>>,

    self_weak: RefCell<Weak<WatcherInner>>,
}

impl WatcherInner {
    fn as_weak_subscriber(&self) -> Weak<dyn Subscriber> {
        match self.self_weak.borrow().upgrade() {
            Some(rc) => Rc::downgrade(&(rc as Rc<dyn Subscriber>)),
            None => Weak::<WatcherInner>::new() as Weak<dyn Subscriber>,
        }
    }

    fn set_state(&self, state: u32) {
        self.flags.set((self.flags.get() & STATE_MASK) | state);
    }

    /// Resolve the path with this watcher as the tracking cursor.
    ///
    /// The cursor is restored by the tracking guard even when resolution
    /// fails; deps touched before the failure stay subscribed.
    fn evaluate(&self) -> Result<Value> {
        let previous = self.deps.take();
        self.dep_ids.borrow_mut().clear();

        self.set_state(EVALUATING);
        let result = with_tracking(self.as_weak_subscriber(), || self.scope.resolve(&self.path));
        self.set_state(IDLE);

        let current = self.dep_ids.borrow();
        for dep in previous.iter().filter(|dep| !current.contains(&dep.id())) {
            dep.remove_subscriber(self.id);
        }

        result
    }

    fn run(&self) -> Result<()> {
        let new_value = self.evaluate()?;
        let old_value = self.last_value.borrow().clone();
        if strict_equals(&new_value, &old_value) {
            return Ok(());
        }

        *self.last_value.borrow_mut() = new_value.clone();
        self.pending.borrow_mut().push_back((new_value, old_value));

        // A callback writing its own path lands here; the outer dispatch drains it
        if self.flags.get() & CALLBACK_RUNNING != 0 {
            return Ok(());
        }
        let Some(mut callback) = self.callback.borrow_mut().take() else {
            return Ok(());
        };

        self.flags.set(self.flags.get() | CALLBACK_RUNNING);
        let result = self.dispatch(&mut callback);
        self.flags.set(self.flags.get() & !CALLBACK_RUNNING);
        *self.callback.borrow_mut() = Some(callback);

        result
    }

    /// Run the callback for every queued change, oldest first.
    fn dispatch(&self, callback: &mut WatchCallback) -> Result<()> {
        loop {
            let Some((new_value, old_value)) = self.pending.borrow_mut().pop_front() else {
                return Ok(());
            };

            tracing::debug!(watcher = self.id, path = %self.path, "watcher.callback");
            if let Err(error) = callback(&self.scope, &new_value, &old_value) {
                self.pending.borrow_mut().clear();
                return Err(error);
            }
        }
    }
}

impl Subscriber for WatcherInner {
    fn id(&self) -> u64 {
        self.id
    }

    fn add_dependency(&self, dep: &Rc<Dep>) {
        if self.dep_ids.borrow_mut().insert(dep.id()) {
            self.deps.borrow_mut().push(dep.clone());
            dep.add_subscriber(self.as_weak_subscriber());
        }
    }

    fn update(&self) -> Result<()> {
        self.run()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// WATCHER
// =============================================================================

/// A subscriber that re-evaluates a path and reports changes.
///
/// Construction evaluates once to seed the last value (and to subscribe to
/// every dep along the path). Later notifications re-evaluate; when the
/// value differs, the callback receives `(scope, new, old)`.
///
/// The watcher stays subscribed for as long as this handle lives.
///
/// # Example
///
/// ```
/// use spark_mvvm::{ReactiveObject, Scope, Watcher};
/// use serde_json::json;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let data = ReactiveObject::from_json(json!({ "a": { "b": 1 } }));
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let log = seen.clone();
/// let _watcher = Watcher::new(Scope::new(data.clone()), "a.b", move |_, new, old| {
///     log.borrow_mut().push((new.clone(), old.clone()));
///     Ok(())
/// })
/// .unwrap();
///
/// let a = data.get("a").unwrap();
/// a.as_object().unwrap().set("b", 2).unwrap();
/// assert_eq!(seen.borrow().len(), 1);
/// ```
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    pub fn new<F>(scope: Scope, expression: &str, callback: F) -> Result<Self>
    where
        F: FnMut(&Scope, &Value, &Value) -> Result<()> + 'static,
    {
        Self::with_path(scope, Path::parse(expression)?, callback)
    }

    pub fn with_path<F>(scope: Scope, path: Path, callback: F) -> Result<Self>
    where
        F: FnMut(&Scope, &Value, &Value) -> Result<()> + 'static,
    {
        let inner = Rc::new(WatcherInner {
            id: with_context(|ctx| ctx.next_subscriber_id()),
            flags: Cell::new(IDLE),
            scope,
            path,
            callback: RefCell::new(Some(Box::new(callback))),
            last_value: RefCell::new(Value::null()),
            pending: RefCell::new(VecDeque::new()),
            dep_ids: RefCell::new(HashSet::new()),
            deps: RefCell::new(Vec::new()),
            self_weak: RefCell::new(Weak::new()),
        });
        *inner.self_weak.borrow_mut() = Rc::downgrade(&inner);

        let seed = inner.evaluate()?;
        *inner.last_value.borrow_mut() = seed;

        Ok(Self { inner })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Last observed value.
    pub fn value(&self) -> Value {
        self.inner.last_value.borrow().clone()
    }

    /// Number of deps the last evaluation subscribed to.
    pub fn dep_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }

    pub fn is_evaluating(&self) -> bool {
        self.inner.flags.get() & EVALUATING != 0
    }

    /// Re-evaluate now and dispatch the callback if the value changed.
    pub fn update(&self) -> Result<()> {
        self.inner.run()
    }

    /// Get access to the inner watcher
    pub fn inner(&self) -> &Rc<WatcherInner> {
        &self.inner
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path.as_str())
            .field("value", &self.value())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
