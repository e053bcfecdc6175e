// ============================================================================
// spark-mvvm - Value
// A JSON-like value whose containers are always observed
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value as Json;

use super::array::ReactiveArray;
use super::object::ReactiveObject;
use crate::reactivity::equality::strict_equals;

// =============================================================================
// VALUE
// =============================================================================

/// A value stored in the reactive tree.
///
/// Keyed mappings and ordered lists only exist in observed form, so every
/// container reachable from a `Value` is already instrumented. Cloning a
/// container value clones the handle, never the data.
#[derive(Clone)]
pub enum Value {
    /// Null, boolean, number or string. Never holds a JSON array or object.
    Scalar(Json),
    Object(ReactiveObject),
    Array(ReactiveArray),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Json::Null)
    }

    /// Convert plain JSON into a reactive value, observing every container.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Object(map) => Value::Object(ReactiveObject::from_map(map)),
            Json::Array(items) => Value::Array(ReactiveArray::from_vec(
                items.into_iter().map(Value::from_json).collect(),
            )),
            scalar => Value::Scalar(scalar),
        }
    }

    /// Snapshot back into plain JSON without registering dependencies.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Scalar(json) => json.clone(),
            Value::Object(object) => object.to_json(),
            Value::Array(array) => array.to_json(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Json::Null))
    }

    pub fn is_container(&self) -> bool {
        !matches!(self, Value::Scalar(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar(Json::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Json::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ReactiveArray> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Text shown for this value in the view.
    ///
    /// Null renders empty, integral numbers render without a fraction and
    /// containers render as compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Scalar(Json::Null) => String::new(),
            Value::Scalar(Json::String(s)) => s.clone(),
            Value::Scalar(Json::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.to_string(),
                (None, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                    format!("{}", f as i64)
                }
                _ => n.to_string(),
            },
            Value::Scalar(other) => other.to_string(),
            container => container.to_json().to_string(),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Scalar(Json::Null) => 0,
            Value::Scalar(Json::Bool(_)) => 1,
            Value::Scalar(Json::Number(_)) => 2,
            Value::Scalar(Json::String(_)) => 3,
            Value::Scalar(_) | Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
}

/// Total order used by [`ReactiveArray::sort`].
///
/// Orders by kind first (null, bool, number, string, array, object), then by
/// value. Containers of the same kind keep their relative order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Scalar(Json::Bool(x)), Value::Scalar(Json::Bool(y))) => x.cmp(y),
        (Value::Scalar(Json::Number(_)), Value::Scalar(Json::Number(_))) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Scalar(Json::String(x)), Value::Scalar(Json::String(y))) => x.cmp(y),
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_equals(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(json) => write!(f, "{json}"),
            Value::Object(_) => write!(f, "Object({})", self.to_json()),
            Value::Array(_) => write!(f, "Array({})", self.to_json()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::null()
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from_json(json)
    }
}

impl From<ReactiveObject> for Value {
    fn from(object: ReactiveObject) -> Self {
        Value::Object(object)
    }
}

impl From<ReactiveArray> for Value {
    fn from(array: ReactiveArray) -> Self {
        Value::Array(array)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Json::String(s.to_owned()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Json::String(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Json::Bool(b))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(Json::from(n))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Scalar(Json::from(n))
                }
            }
        )+
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

// =============================================================================
// TESTS
// =============================================================================
