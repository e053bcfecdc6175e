// ============================================================================
// spark-mvvm - ReactiveArray
// An ordered list owning one Dep for the list as a whole
// ============================================================================

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use super::value::{compare_values, Value};
use crate::error::Result;
use crate::reactivity::dep::Dep;

// =============================================================================
// REACTIVE ARRAY
// =============================================================================

struct ArrayInner {
    dep: Rc<Dep>,
    items: RefCell<Vec<Value>>,
}

/// An observed list.
///
/// Unlike [`ReactiveObject`](super::ReactiveObject) there is no per-index
/// Dep: every read tracks the list's own Dep and every mutating operation
/// notifies it exactly once. Inserted containers arrive already observed,
/// because a [`Value`] can only hold observed containers.
///
/// Each mutator returns what the plain list operation returns (popped
/// element, removed range, new length).
///
/// # Example
///
/// ```
/// use spark_mvvm::observer::ReactiveArray;
/// use spark_mvvm::Value;
///
/// let list = ReactiveArray::new();
/// assert_eq!(list.push(1).unwrap(), 1);
/// assert_eq!(list.push(2).unwrap(), 2);
/// assert_eq!(list.pop().unwrap(), Some(Value::from(2)));
/// ```
#[derive(Clone)]
pub struct ReactiveArray {
    inner: Rc<ArrayInner>,
}

impl ReactiveArray {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                dep: Dep::new(),
                items: RefCell::new(items),
            }),
        }
    }

    /// The Dep owning the list as a whole.
    pub fn dep(&self) -> &Rc<Dep> {
        &self.inner.dep
    }

    /// Same store instance.
    pub fn ptr_eq(&self, other: &ReactiveArray) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run a mutating operation, then notify the list's Dep once.
    ///
    /// The items borrow is released before notifying, so watchers re-running
    /// because of the notification may read the list.
    fn mutate<R>(&self, op: impl FnOnce(&mut Vec<Value>) -> R) -> Result<R> {
        let result = op(&mut self.inner.items.borrow_mut());
        self.inner.dep.notify()?;
        Ok(result)
    }

    // =========================================================================
    // READ (tracks the list Dep)
    // =========================================================================

    pub fn len(&self) -> usize {
        self.inner.dep.depend();
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.dep.depend();
        self.inner.items.borrow().get(index).cloned()
    }

    /// Tracked snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.dep.depend();
        self.inner.items.borrow().clone()
    }

    // =========================================================================
    // APPEND / REMOVE AT THE ENDS
    // =========================================================================

    /// Append at the end. Returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize> {
        let value = value.into();
        self.mutate(|items| {
            items.push(value);
            items.len()
        })
    }

    /// Remove from the end. Notifies even when the list was empty.
    pub fn pop(&self) -> Result<Option<Value>> {
        self.mutate(Vec::pop)
    }

    /// Remove from the front.
    pub fn shift(&self) -> Result<Option<Value>> {
        self.mutate(|items| {
            if items.is_empty() {
                None
            } else {
                Some(items.remove(0))
            }
        })
    }

    /// Insert at the front. Returns the new length.
    pub fn unshift(&self, value: impl Into<Value>) -> Result<usize> {
        let value = value.into();
        self.mutate(|items| {
            items.insert(0, value);
            items.len()
        })
    }

    // =========================================================================
    // SPLICE
    // =========================================================================

    /// Remove `delete_count` elements at `start` and insert `inserted` there.
    ///
    /// `start` and `delete_count` are clamped to the list bounds. Returns the
    /// removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        inserted: impl IntoIterator<Item = Value>,
    ) -> Result<Vec<Value>> {
        let inserted: Vec<Value> = inserted.into_iter().collect();
        self.mutate(|items| {
            let start = start.min(items.len());
            let end = start.saturating_add(delete_count).min(items.len());
            items.splice(start..end, inserted).collect()
        })
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// Out-of-range indices leave the list unchanged and notify nobody.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<Option<Value>> {
        if index >= self.inner.items.borrow().len() {
            return Ok(None);
        }
        let value = value.into();
        self.mutate(|items| Some(std::mem::replace(&mut items[index], value)))
    }

    // =========================================================================
    // REORDER
    // =========================================================================

    /// Sort in place by [`compare_values`].
    pub fn sort(&self) -> Result<()> {
        self.mutate(|items| items.sort_by(compare_values))
    }

    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) -> Result<()> {
        self.mutate(|items| items.sort_by(compare))
    }

    pub fn reverse(&self) -> Result<()> {
        self.mutate(|items| items.reverse())
    }

    // =========================================================================
    // UTILITIES
    // =========================================================================

    /// Untracked JSON snapshot.
    pub fn to_json(&self) -> Json {
        Json::Array(self.inner.items.borrow().iter().map(Value::to_json).collect())
    }
}

impl Default for ReactiveArray {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactiveArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveArray")
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
    use serde_json::json;

    fn list(json: Json) -> ReactiveArray {
        match Value::from_json(json) {
            Value::Array(array) => array,
            other => panic!("not a list: {other:?}"),
        }
    }

    #[test]
    fn native_results_pass_through() {
        let l = list(json!([1, 2, 3]));

        assert_eq!(l.push(4).unwrap(), 4);
        assert_eq!(l.pop().unwrap(), Some(Value::from(4)));
        assert_eq!(l.shift().unwrap(), Some(Value::from(1)));
        assert_eq!(l.unshift(0).unwrap(), 3);
        assert_eq!(l.to_json(), json!([0, 2, 3]));
    }

    #[test]
    fn empty_ends() {
        let l = ReactiveArray::new();
        assert_eq!(l.pop().unwrap(), None);
        assert_eq!(l.shift().unwrap(), None);
        assert!(l.is_empty());
    }

    #[test]
    fn splice_removes_and_inserts() {
        let l = list(json!(["a", "b", "c", "d"]));
        let removed = l
            .splice(1, 2, vec![Value::from("x"), Value::from("y"), Value::from("z")])
            .unwrap();
        assert_eq!(removed, vec![Value::from("b"), Value::from("c")]);
        assert_eq!(l.to_json(), json!(["a", "x", "y", "z", "d"]));
    }

    #[test]
    fn splice_clamps_bounds() {
        let l = list(json!([1, 2]));
        let removed = l.splice(10, 10, vec![Value::from(3)]).unwrap();
        assert!(removed.is_empty());
        assert_eq!(l.to_json(), json!([1, 2, 3]));

        let removed = l.splice(1, usize::MAX, Vec::new()).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(l.to_json(), json!([1]));
    }

    #[test]
    fn sort_and_reverse() {
        let l = list(json!([3, 1, 2]));
        l.sort().unwrap();
        assert_eq!(l.to_json(), json!([1, 2, 3]));
        l.reverse().unwrap();
        assert_eq!(l.to_json(), json!([3, 2, 1]));
        l.sort_by(|a, b| compare_values(b, a).reverse()).unwrap();
        assert_eq!(l.to_json(), json!([1, 2, 3]));
    }

    #[test]
    fn set_replaces_in_range_only() {
        let l = list(json!([1, 2]));
        assert_eq!(l.set(0, 9).unwrap(), Some(Value::from(1)));
        assert_eq!(l.set(5, 9).unwrap(), None);
        assert_eq!(l.to_json(), json!([9, 2]));
    }

    #[test]
    fn inserted_objects_are_observed() {
        let l = ReactiveArray::new();
        l.push(json!({ "done": false })).unwrap();
        let item = l.get(0).unwrap();
        assert!(item.as_object().unwrap().set("done", true).unwrap());
    }
}
