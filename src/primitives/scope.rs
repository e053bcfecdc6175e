// ============================================================================
// spark-mvvm - Scope
// The context an expression is evaluated against
// ============================================================================

use std::fmt;
use std::rc::Rc;

use super::path::{Path, Segment};
use crate::error::{BindError, Result};
use crate::observer::{ReactiveObject, Value};
use crate::reactivity::tracking::untrack;

// =============================================================================
// LOCALS
// =============================================================================

/// A frame of names layered over the root data (one per iteration clone).
struct Locals {
    names: Vec<(String, Value)>,
    parent: Option<Rc<Locals>>,
}

impl Locals {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.lookup(name)))
    }
}

// =============================================================================
// SCOPE
// =============================================================================

/// Root data plus zero or more frames of local names.
///
/// The first path segment is looked up in the innermost frame first and
/// falls back to the root data; the rest of the path walks the value tree
/// through its tracked readers.
///
/// # Example
///
/// ```
/// use spark_mvvm::{ReactiveObject, Scope, Value};
/// use serde_json::json;
///
/// let scope = Scope::new(ReactiveObject::from_json(json!({ "title": "todo" })));
/// let item = scope.child([("item".to_string(), Value::from("milk"))]);
///
/// assert_eq!(item.eval("item").unwrap(), Value::from("milk"));
/// assert_eq!(item.eval("title").unwrap(), Value::from("todo"));
/// ```
#[derive(Clone)]
pub struct Scope {
    data: ReactiveObject,
    locals: Option<Rc<Locals>>,
}

impl Scope {
    pub fn new(data: ReactiveObject) -> Self {
        Self { data, locals: None }
    }

    pub fn data(&self) -> &ReactiveObject {
        &self.data
    }

    /// Derive a scope with extra local names.
    pub fn child(&self, names: impl IntoIterator<Item = (String, Value)>) -> Scope {
        Scope {
            data: self.data.clone(),
            locals: Some(Rc::new(Locals {
                names: names.into_iter().collect(),
                parent: self.locals.clone(),
            })),
        }
    }

    /// Look up a local name (untracked; locals are plain values).
    pub fn local(&self, name: &str) -> Option<Value> {
        self.locals
            .as_ref()
            .and_then(|locals| locals.lookup(name))
            .cloned()
    }

    /// Resolve `path`, registering the active watcher along the way.
    ///
    /// A missing last key (or list index) resolves to null; a missing
    /// segment with more path after it is `PropertyNotFound`.
    pub fn resolve(&self, path: &Path) -> Result<Value> {
        let segments = path.segments();
        let Some((first, rest)) = segments.split_first() else {
            return Err(BindError::malformed(path.as_str(), "empty path"));
        };

        let mut value = self
            .local(&first.key())
            .or_else(|| self.data.get(&first.key()));
        let mut reached = first;

        for segment in rest {
            let Some(parent) = value else {
                return Err(BindError::not_found(reached.to_string(), path.as_str()));
            };
            value = path.step(&parent, segment)?;
            reached = segment;
        }
        Ok(value.unwrap_or_else(Value::null))
    }

    /// Parse and resolve `expression`.
    pub fn eval(&self, expression: &str) -> Result<Value> {
        self.resolve(&Path::parse(expression)?)
    }

    /// Write `value` at `path` through the store's writer.
    ///
    /// A single-segment path writes the root data even when a local of the
    /// same name shadows it. Longer paths resolve their parent untracked and
    /// write its last key (or list index).
    pub fn assign(&self, path: &Path, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Err(BindError::malformed(path.as_str(), "empty path"));
        };

        if parents.is_empty() {
            return self.data.set(&last.key(), value);
        }

        let parent_path = Path::parse(
            &parents
                .iter()
                .map(Segment::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )?;
        let parent = untrack(|| self.resolve(&parent_path))?;

        match (&parent, last) {
            (Value::Object(object), segment) => object.set(&segment.key(), value),
            (Value::Array(array), Segment::Index(index)) => {
                Ok(array.set(*index, value)?.is_some())
            }
            _ => Err(BindError::not_found(last.to_string(), path.as_str())),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        let mut frame = self.locals.as_deref();
        while let Some(locals) = frame {
            names.extend(locals.names.iter().map(|(key, _)| key.clone()));
            frame = locals.parent.as_deref();
        }
        f.debug_struct("Scope")
            .field("data", &self.data)
            .field("locals", &names)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
