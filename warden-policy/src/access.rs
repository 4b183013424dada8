//! Helpers for writing predicate rules over loosely shaped viewer/entity data.
//!
//! Predicates receive their arguments untouched, so reading a property of a
//! missing entity must fail loudly rather than quietly deny. [`prop`] does
//! that, and the error flows out of [`PolicyStore::evaluate`](crate::PolicyStore::evaluate)
//! unchanged.

use serde_json::Value;

use crate::error::{RuleError, kind_of};

static NULL: Value = Value::Null;

/// Reads `name` from an optional value.
///
/// Objects yield the field, or `null` when the field is missing. Other
/// present, non-null values yield `null`.
///
/// # Errors
///
/// Returns [`RuleError::CannotReadProperty`] when `target` is absent or `null`.
pub fn prop<'a>(target: Option<&'a Value>, name: &str) -> Result<&'a Value, RuleError> {
    match target {
        None | Some(Value::Null) => Err(RuleError::CannotReadProperty {
            property: name.to_owned(),
            target: kind_of(target),
        }),
        Some(Value::Object(map)) => Ok(map.get(name).unwrap_or(&NULL)),
        Some(_) => Ok(&NULL),
    }
}

/// Applies loose truthiness: `null`, `false`, zero, and empty strings are falsy.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prop_reads_object_fields() {
        let post = json!({ "authorId": 4 });
        assert_eq!(prop(Some(&post), "authorId").unwrap(), &json!(4));
        assert_eq!(prop(Some(&post), "missing").unwrap(), &Value::Null);
        assert_eq!(prop(Some(&json!(7)), "len").unwrap(), &Value::Null);
    }

    #[test]
    fn prop_rejects_missing_targets() {
        let err = prop(None, "authorId").unwrap_err();
        assert_eq!(err.to_string(), "cannot read property `authorId` of undefined");

        let err = prop(Some(&Value::Null), "id").unwrap_err();
        assert_eq!(
            err,
            RuleError::CannotReadProperty {
                property: "id".into(),
                target: "null",
            }
        );
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy_value in [json!(true), json!(4), json!("x"), json!([]), json!({})] {
            assert!(truthy(&truthy_value), "{truthy_value} should be truthy");
        }
    }
}
