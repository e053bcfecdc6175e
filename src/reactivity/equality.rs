// ============================================================================
// spark-mvvm - Equality Functions
// No-op guards for property writes and watcher change detection
// ============================================================================

use serde_json::Value as Json;

use crate::observer::Value;

/// Equality function deciding whether a write is a no-op
pub type EqualsFn = fn(&Value, &Value) -> bool;

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Exact equality without type coercion.
///
/// - numbers compare by numeric value (`1` equals `1.0`)
/// - other scalars compare by value and type (`0` differs from `""`)
/// - objects and arrays compare by identity
///
/// # Example
/// ```
/// use spark_mvvm::reactivity::equality::strict_equals;
/// use spark_mvvm::Value;
///
/// assert!(strict_equals(&Value::from(1), &Value::from(1.0)));
/// assert!(!strict_equals(&Value::from(0), &Value::from("")));
/// ```
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => scalar_strict(x, y),
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        (Value::Array(x), Value::Array(y)) => x.ptr_eq(y),
        _ => false,
    }
}

fn scalar_strict(a: &Json, b: &Json) -> bool {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

// =============================================================================
// LOOSE EQUALITY (Opt-in)
// =============================================================================

/// Coercive equality: numbers, numeric strings and booleans compare by
/// numeric value, so `0` equals `""` and `1` equals `true`.
///
/// Suppresses type-changing writes. Opt into it per object with
/// [`ReactiveObject::set_equals`](crate::observer::ReactiveObject::set_equals).
///
/// # Example
/// ```
/// use spark_mvvm::reactivity::equality::loose_equals;
/// use spark_mvvm::Value;
///
/// assert!(loose_equals(&Value::from(0), &Value::from("")));
/// assert!(loose_equals(&Value::from("1"), &Value::from(true)));
/// assert!(!loose_equals(&Value::null(), &Value::from(0)));
/// ```
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => scalar_loose(x, y),
        _ => strict_equals(a, b),
    }
}

fn scalar_loose(a: &Json, b: &Json) -> bool {
    match (a, b) {
        (Json::Null, Json::Null) => true,
        (Json::Null, _) | (_, Json::Null) => false,
        (Json::String(x), Json::String(y)) => x == y,
        _ => match (to_number(a), to_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn to_number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Json::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
