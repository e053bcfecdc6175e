// ============================================================================
// spark-mvvm - Errors
// The failure taxonomy shared by evaluation, writes and binding setup
// ============================================================================

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// A path segment does not exist on its parent value.
    #[error("can not find the property `{segment}` in `{path}`")]
    PropertyNotFound { segment: String, path: String },

    /// An event or model directive named a method that is not registered.
    #[error("directive `{directive}` can not resolve method `{method}`")]
    DirectiveResolution { directive: String, method: String },

    /// A one-way directive whose kind has no registered updater.
    #[error("unknown directive `{directive}`")]
    UnknownDirective { directive: String },

    #[error("malformed expression `{expression}`: {reason}")]
    MalformedExpression { expression: String, reason: String },

    /// An iteration directive whose path is not a list.
    #[error("`{path}` does not resolve to a list")]
    ExpectedList { path: String },

    #[error("data root must be an object")]
    InvalidRoot,
}

impl BindError {
    #[must_use]
    pub fn not_found(segment: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            segment: segment.into(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn malformed(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Binding-setup failures are isolated to one binding; everything else
    /// propagates to the caller.
    #[must_use]
    pub fn is_binding_local(&self) -> bool {
        !matches!(self, Self::InvalidRoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = BindError::not_found("b", "a.b");
        assert_eq!(err.to_string(), "can not find the property `b` in `a.b`");

        let err = BindError::malformed("remove(", "unclosed argument list");
        assert!(err.to_string().contains("remove("));
    }

    #[test]
    fn root_errors_are_not_binding_local() {
        assert!(!BindError::InvalidRoot.is_binding_local());
        assert!(BindError::ExpectedList { path: "items".into() }.is_binding_local());
    }
}
