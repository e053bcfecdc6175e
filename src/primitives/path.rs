// ============================================================================
// spark-mvvm - Path
// Dotted access expressions, parsed once and walked on every evaluation
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::core::constants::LENGTH_KEY;
use crate::error::{BindError, Result};
use crate::observer::Value;

// =============================================================================
// SEGMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    /// Canonical decimal segment (`0`, `12`, not `007`); indexes a list, or
    /// names a key on a mapping
    Index(usize),
}

impl Segment {
    fn parse(raw: &str) -> Segment {
        let canonical = raw == "0" || !raw.starts_with('0');
        if canonical && !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Segment::Index(index);
            }
        }
        Segment::Field(raw.to_owned())
    }

    /// The segment as a mapping key.
    pub fn key(&self) -> String {
        match self {
            Segment::Field(name) => name.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

// =============================================================================
// PATH
// =============================================================================

/// A precompiled access path such as `todo.items.0.title`.
///
/// # Example
///
/// ```
/// use spark_mvvm::primitives::path::{Path, Segment};
///
/// let path: Path = " items.0.title ".parse().unwrap();
/// assert_eq!(path.segments()[1], Segment::Index(0));
/// assert_eq!(path.to_string(), "items.0.title");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    source: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a dotted expression. Surrounding whitespace is ignored; empty
    /// segments are rejected.
    pub fn parse(expression: &str) -> Result<Self> {
        let source = expression.trim();
        if source.is_empty() {
            return Err(BindError::malformed(expression, "empty path"));
        }

        let mut segments = Vec::new();
        for raw in source.split('.') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(BindError::malformed(expression, "empty path segment"));
            }
            segments.push(Segment::parse(raw));
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Path with `segment` appended (`items` + `length`).
    pub fn join(&self, segment: &str) -> Result<Path> {
        Path::parse(&format!("{}.{}", self.source, segment))
    }

    /// Resolve one step from `value`, through the tracked readers.
    ///
    /// `Ok(None)` is a container without that key or index; stepping into
    /// anything else is an error.
    pub(crate) fn step(&self, value: &Value, segment: &Segment) -> Result<Option<Value>> {
        let not_found = || BindError::not_found(segment.to_string(), self.source.clone());

        match (value, segment) {
            (Value::Object(object), segment) => Ok(object.get(&segment.key())),
            (Value::Array(array), Segment::Index(index)) => Ok(array.get(*index)),
            (Value::Array(array), Segment::Field(name)) if name == LENGTH_KEY => {
                Ok(Some(Value::from(array.len())))
            }
            (Value::Scalar(_), Segment::Field(name)) if name == LENGTH_KEY => value
                .as_str()
                .map(|s| Some(Value::from(s.chars().count())))
                .ok_or_else(not_found),
            _ => Err(not_found()),
        }
    }
}

impl FromStr for Path {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// TESTS
// =============================================================================
