// ============================================================================
// spark-mvvm - Observer
// Instrumented read/write surface over a JSON-like value tree
// ============================================================================
//
// Containers never exist in plain form inside the tree: a keyed mapping is a
// ReactiveObject (one Dep per key plus a container Dep) and a list is a
// ReactiveArray (one Dep for the list). Wrapping is therefore structural and
// idempotent: observing an already observed value hands back the same store.
// ============================================================================

mod array;
mod object;
mod value;

pub use array::ReactiveArray;
pub use object::ReactiveObject;
pub use value::{compare_values, Value};

/// Observe a value.
///
/// Scalars pass through unchanged, plain JSON containers become observed
/// stores, and already observed containers return the same store instance.
///
/// # Example
///
/// ```
/// use spark_mvvm::observer::observe;
/// use serde_json::json;
///
/// let once = observe(json!({ "a": 1 }));
/// let twice = observe(once.clone());
/// assert!(once.as_object().unwrap().ptr_eq(twice.as_object().unwrap()));
/// ```
pub fn observe(value: impl Into<Value>) -> Value {
    value.into()
}
