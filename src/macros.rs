// ============================================================================
// spark-mvvm - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// Reduces the boilerplate of cloning `Rc` handles, nodes or scopes before
/// moving them into a watcher callback or event listener.
///
/// # Usage
///
/// ```rust
/// use spark_mvvm::{cloned, ReactiveObject, Scope, Watcher};
/// use serde_json::json;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let data = ReactiveObject::from_json(json!({ "n": 1 }));
/// let hits = Rc::new(Cell::new(0));
///
/// let _w = Watcher::new(Scope::new(data.clone()), "n", cloned!(hits => move |_, _, _| {
///     hits.set(hits.get() + 1);
///     Ok(())
/// }))
/// .unwrap();
///
/// data.set("n", 2).unwrap();
/// assert_eq!(hits.get(), 1);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}
