// ============================================================================
// spark-mvvm - ReactiveObject
// A keyed mapping with one Dep per key plus one for the whole container
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use super::value::Value;
use crate::error::Result;
use crate::reactivity::dep::Dep;
use crate::reactivity::equality::{strict_equals, EqualsFn};

// =============================================================================
// PROPERTY
// =============================================================================

/// One key of an observed mapping: its value and its Dep.
struct Property {
    dep: Rc<Dep>,
    value: RefCell<Value>,
    /// Frozen properties are stored but not instrumented.
    frozen: bool,
}

impl Property {
    fn new(value: Value, frozen: bool) -> Rc<Self> {
        Rc::new(Self {
            dep: Dep::new(),
            value: RefCell::new(value),
            frozen,
        })
    }
}

// =============================================================================
// REACTIVE OBJECT
// =============================================================================

struct ObjectInner {
    /// Dep owning the container as a whole
    dep: Rc<Dep>,
    props: RefCell<IndexMap<String, Rc<Property>>>,
    equals: Cell<EqualsFn>,
}

/// An observed keyed mapping.
///
/// Every key gets an instrumented accessor pair:
/// - [`get`](Self::get) registers the active watcher on the key's Dep, and on
///   the child container's own Dep when the value is an object or array
/// - [`set`](Self::set) is a no-op for an equal value, otherwise stores the
///   value and notifies the key's Dep
///
/// # Example
///
/// ```
/// use spark_mvvm::observer::ReactiveObject;
/// use serde_json::json;
///
/// let data = ReactiveObject::from_json(json!({ "msg": "hello" }));
/// assert_eq!(data.get("msg").unwrap().as_str(), Some("hello"));
///
/// assert!(data.set("msg", "world").unwrap());
/// assert!(!data.set("msg", "world").unwrap());
/// ```
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

impl ReactiveObject {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                dep: Dep::new(),
                props: RefCell::new(IndexMap::new()),
                equals: Cell::new(strict_equals),
            }),
        }
    }

    pub fn from_map(map: Map<String, Json>) -> Self {
        let object = Self::new();
        {
            let mut props = object.inner.props.borrow_mut();
            for (key, json) in map {
                props.insert(key, Property::new(Value::from_json(json), false));
            }
        }
        object
    }

    /// Observe a JSON value, wrapping non-objects in an empty mapping.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Object(map) => Self::from_map(map),
            _ => Self::new(),
        }
    }

    /// The Dep owning this container as a whole.
    pub fn dep(&self) -> &Rc<Dep> {
        &self.inner.dep
    }

    /// Same store instance.
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Replace the no-op guard used by [`set`](Self::set) on this object.
    pub fn set_equals(&self, equals: EqualsFn) {
        self.inner.equals.set(equals);
    }

    fn property(&self, key: &str) -> Option<Rc<Property>> {
        self.inner.props.borrow().get(key).cloned()
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Tracked read of `key`.
    ///
    /// A missing key tracks the container Dep, so a later insertion of the
    /// key re-runs the reader.
    pub fn get(&self, key: &str) -> Option<Value> {
        let Some(prop) = self.property(key) else {
            self.inner.dep.depend();
            return None;
        };

        let value = prop.value.borrow().clone();
        if !prop.frozen {
            prop.dep.depend();
            match &value {
                Value::Object(child) => child.dep().depend(),
                Value::Array(child) => child.dep().depend(),
                Value::Scalar(_) => {}
            }
        }
        Some(value)
    }

    /// Tracked check for `key` (tracks the container Dep).
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.dep.depend();
        self.inner.props.borrow().contains_key(key)
    }

    /// Tracked list of keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.dep.depend();
        self.inner.props.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.dep.depend();
        self.inner.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Write `key`, returning whether the stored value changed.
    ///
    /// - equal value: no-op
    /// - frozen key: stored silently, nobody is notified
    /// - new key: inserted and the container Dep is notified
    /// - otherwise: stored and the key's Dep is notified
    ///
    /// Errors from watchers re-running because of this write propagate out.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();

        let Some(prop) = self.property(key) else {
            self.inner
                .props
                .borrow_mut()
                .insert(key.to_owned(), Property::new(value, false));
            tracing::trace!(key, "object.insert");
            self.inner.dep.notify()?;
            return Ok(true);
        };

        let equals = self.inner.equals.get();
        if equals(&prop.value.borrow(), &value) {
            return Ok(false);
        }

        // The replaced value (and any child store it owned) drops here
        drop(prop.value.replace(value));

        if !prop.frozen {
            prop.dep.notify()?;
        }
        Ok(true)
    }

    /// Insert `key` without instrumentation.
    ///
    /// Reads and writes of a frozen key are never tracked.
    pub fn define_frozen(&self, key: &str, value: impl Into<Value>) {
        self.inner
            .props
            .borrow_mut()
            .insert(key.to_owned(), Property::new(value.into(), true));
    }

    /// Remove `key`, notifying the container Dep.
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        let removed = self.inner.props.borrow_mut().shift_remove(key);
        match removed {
            Some(prop) => {
                let value = prop.value.borrow().clone();
                self.inner.dep.notify()?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // =========================================================================
    // UTILITIES
    // =========================================================================

    /// Untracked JSON snapshot.
    pub fn to_json(&self) -> Json {
        let props = self.inner.props.borrow();
        let map: Map<String, Json> = props
            .iter()
            .map(|(key, prop)| (key.clone(), prop.value.borrow().to_json()))
            .collect();
        Json::Object(map)
    }

    /// Number of subscribers on `key`'s Dep (`None` for missing keys).
    pub fn subscriber_count(&self, key: &str) -> Option<usize> {
        self.property(key).map(|prop| prop.dep.subscriber_count())
    }
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("data", &self.to_json())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::equality::loose_equals;
    use serde_json::json;

    #[test]
    fn read_and_write() {
        let data = ReactiveObject::from_json(json!({ "a": 1, "b": "x" }));
        assert_eq!(data.get("a"), Some(Value::from(1)));
        assert_eq!(data.get("missing"), None);

        assert!(data.set("a", 2).unwrap());
        assert_eq!(data.get("a"), Some(Value::from(2)));
        assert!(!data.set("a", 2).unwrap());
    }

    #[test]
    fn written_containers_are_observed() {
        let data = ReactiveObject::from_json(json!({ "a": null }));
        data.set("a", json!({ "b": [1, 2] })).unwrap();

        let a = data.get("a").unwrap();
        let b = a.as_object().unwrap().get("b").unwrap();
        assert_eq!(b.as_array().unwrap().len(), 2);
    }

    #[test]
    fn insert_and_remove_keys() {
        let data = ReactiveObject::new();
        assert!(data.is_empty());

        data.set("k", "v").unwrap();
        assert_eq!(data.keys(), vec!["k".to_string()]);
        assert!(data.contains_key("k"));

        let removed = data.remove("k").unwrap();
        assert_eq!(removed, Some(Value::from("v")));
        assert_eq!(data.remove("k").unwrap(), None);
    }

    #[test]
    fn frozen_keys_are_stored_untracked() {
        let data = ReactiveObject::new();
        data.define_frozen("id", 7);
        assert_eq!(data.get("id"), Some(Value::from(7)));
        assert!(data.set("id", 8).unwrap());
        assert_eq!(data.get("id"), Some(Value::from(8)));
    }

    #[test]
    fn strict_guard_allows_type_changing_writes() {
        let data = ReactiveObject::from_json(json!({ "n": 0 }));
        assert!(data.set("n", "").unwrap());
    }

    #[test]
    fn loose_guard_suppresses_coercible_writes() {
        let data = ReactiveObject::from_json(json!({ "n": 0 }));
        data.set_equals(loose_equals);
        assert!(!data.set("n", "").unwrap());
        assert!(data.set("n", "1").unwrap());
    }

    #[test]
    fn snapshot_keeps_key_order() {
        let data = ReactiveObject::from_json(json!({ "z": 1, "a": 2 }));
        data.set("m", 3).unwrap();
        assert_eq!(data.keys(), vec!["z", "a", "m"]);
    }
}
