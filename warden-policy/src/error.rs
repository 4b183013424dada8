//! Error types surfaced by the policy store.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result alias for policy store operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Names the call argument that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    /// The viewer passed to an evaluation.
    Viewer,
    /// The action name passed to an evaluation.
    Action,
    /// The subject map or type string passed to an evaluation.
    Subject,
    /// The entity type passed to `define`/`undefine`.
    Type,
    /// The single action or batch of actions passed to `define`/`undefine`.
    Actions,
}

impl Argument {
    /// Returns the argument name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Action => "action",
            Self::Subject => "subject",
            Self::Type => "type",
            Self::Actions => "action(s)",
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`PolicyStore`](crate::PolicyStore) operations.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// An argument had the wrong kind of value.
    #[error("invalid argument `{argument}`: expected {expected}, but got {actual}")]
    InvalidArgument {
        /// Which argument was rejected.
        argument: Argument,
        /// Human-readable description of the accepted kinds.
        expected: &'static str,
        /// Kind of the value that was supplied.
        actual: &'static str,
    },
    /// An object-form subject did not carry exactly one type key.
    #[error("subject must have exactly one property, but got {keys}")]
    InvalidShape {
        /// Number of keys found on the subject.
        keys: usize,
    },
    /// The referenced type has never been defined on the store.
    #[error("unknown permission type `{type_name}`")]
    UnknownType {
        /// The type that could not be resolved.
        type_name: String,
    },
    /// A predicate rule failed while deciding; carried through unchanged.
    #[error(transparent)]
    Rule(#[from] anyhow::Error),
}

impl PolicyError {
    pub(crate) fn invalid_argument(
        argument: Argument,
        expected: &'static str,
        actual: Option<&Value>,
    ) -> Self {
        Self::InvalidArgument {
            argument,
            expected,
            actual: kind_of(actual),
        }
    }

    pub(crate) fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Returns the rejected argument for [`PolicyError::InvalidArgument`] errors.
    #[must_use]
    pub fn argument(&self) -> Option<Argument> {
        match self {
            Self::InvalidArgument { argument, .. } => Some(*argument),
            _ => None,
        }
    }
}

/// Errors raised by the rule authoring helpers in [`crate::access`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A property was read from an absent or `null` value.
    #[error("cannot read property `{property}` of {target}")]
    CannotReadProperty {
        /// Name of the property being read.
        property: String,
        /// Kind of the value the read was attempted on.
        target: &'static str,
    },
}

/// Returns the kind name of an optional JSON value, `undefined` when absent.
#[must_use]
pub fn kind_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_name_the_argument() {
        let err = PolicyError::invalid_argument(Argument::Actions, "a string", Some(&json!(4)));
        assert_eq!(
            err.to_string(),
            "invalid argument `action(s)`: expected a string, but got number"
        );
        assert_eq!(err.argument(), Some(Argument::Actions));
    }

    #[test]
    fn unknown_type_names_the_type() {
        let err = PolicyError::unknown_type("tweet");
        assert!(err.to_string().contains("tweet"));
        assert_eq!(err.argument(), None);
    }

    #[test]
    fn rule_errors_are_transparent() {
        let err = PolicyError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn kinds_cover_absent_values() {
        assert_eq!(kind_of(None), "undefined");
        assert_eq!(kind_of(Some(&Value::Null)), "null");
        assert_eq!(kind_of(Some(&json!([1]))), "array");
    }
}
