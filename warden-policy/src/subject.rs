//! Call arguments for evaluations and rule definitions.
//!
//! Typed constructors are the usual way in. The `from_value` conversions exist
//! for hosts that forward loosely typed data and want the store to reject the
//! wrong kind of argument with a precise error.

use serde_json::Value;

use crate::error::{Argument, PolicyError, PolicyResult};

/// What an evaluation is about: a concrete entity of a type, or the type alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// A single `{ type: entity }` pair.
    Entity {
        /// Entity type the rule table is keyed on.
        type_name: String,
        /// Entity handed to predicate rules.
        entity: Value,
    },
    /// A bare type name; predicate rules receive no entity.
    Type(String),
}

impl Subject {
    /// Creates a subject for a concrete entity of the given type.
    #[must_use]
    pub fn entity(type_name: impl Into<String>, entity: Value) -> Self {
        Self::Entity {
            type_name: type_name.into(),
            entity,
        }
    }

    /// Creates a subject naming only a type.
    #[must_use]
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self::Type(type_name.into())
    }

    /// Returns the type the subject resolves to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Entity { type_name, .. } | Self::Type(type_name) => type_name,
        }
    }

    /// Returns the entity, absent for bare type subjects.
    #[must_use]
    pub fn entity_value(&self) -> Option<&Value> {
        match self {
            Self::Entity { entity, .. } => Some(entity),
            Self::Type(_) => None,
        }
    }

    /// Interprets a loosely typed subject argument.
    ///
    /// Strings become [`Subject::Type`]. Objects must hold exactly one key,
    /// which names the type; arrays are treated as objects keyed by index.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidArgument`] for anything other than an
    /// object, array or string, and [`PolicyError::InvalidShape`] when the
    /// key count is not one.
    pub fn from_value(value: Option<&Value>) -> PolicyResult<Self> {
        match value {
            Some(Value::String(type_name)) => Ok(Self::of_type(type_name.clone())),
            Some(Value::Object(map)) => match map.iter().next() {
                Some((type_name, entity)) if map.len() == 1 => {
                    Ok(Self::entity(type_name.clone(), entity.clone()))
                }
                _ => Err(PolicyError::InvalidShape { keys: map.len() }),
            },
            Some(Value::Array(items)) => match items.as_slice() {
                [entity] => Ok(Self::entity("0", entity.clone())),
                _ => Err(PolicyError::InvalidShape { keys: items.len() }),
            },
            other => Err(PolicyError::invalid_argument(
                Argument::Subject,
                "an object or a string",
                other,
            )),
        }
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self::of_type(value)
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self::Type(value)
    }
}

impl<S: Into<String>> From<(S, Value)> for Subject {
    fn from((type_name, entity): (S, Value)) -> Self {
        Self::entity(type_name, entity)
    }
}

/// One action or a batch of actions sharing a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actions {
    /// A single action name.
    One(String),
    /// Several action names, processed in order.
    Many(Vec<String>),
}

impl Actions {
    /// Iterates over the action names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            Self::One(action) => std::slice::from_ref(action),
            Self::Many(actions) => actions,
        };
        names.iter().map(String::as_str)
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(actions) => actions.len(),
        }
    }

    /// Returns true for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interprets a loosely typed action argument.
    ///
    /// The whole batch is checked before anything is returned, so a bad
    /// element never leaves a partially applied definition behind.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidArgument`] unless the value is a string
    /// or an array made only of strings.
    pub fn from_value(value: Option<&Value>) -> PolicyResult<Self> {
        const EXPECTED: &str = "a string or an array of strings";
        match value {
            Some(Value::String(action)) => Ok(Self::One(action.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(action) => Ok(action.clone()),
                    other => Err(PolicyError::invalid_argument(
                        Argument::Actions,
                        EXPECTED,
                        Some(other),
                    )),
                })
                .collect::<PolicyResult<Vec<_>>>()
                .map(Self::Many),
            other => Err(PolicyError::invalid_argument(
                Argument::Actions,
                EXPECTED,
                other,
            )),
        }
    }
}

impl From<&str> for Actions {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for Actions {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Actions {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<&[&str]> for Actions {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(|&action| action.to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Actions {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.into_iter().map(str::to_owned).collect())
    }
}

/// Checks that a viewer is an object, an array, `null`, or absent.
pub(crate) fn check_viewer(viewer: Option<&Value>) -> PolicyResult<()> {
    match viewer {
        None | Some(Value::Null | Value::Object(_) | Value::Array(_)) => Ok(()),
        other => Err(PolicyError::invalid_argument(
            Argument::Viewer,
            "an object, null, or undefined",
            other,
        )),
    }
}

/// Extracts a string argument such as an action or type name.
pub(crate) fn expect_str(value: Option<&Value>, argument: Argument) -> PolicyResult<&str> {
    match value {
        Some(Value::String(text)) => Ok(text),
        other => Err(PolicyError::invalid_argument(argument, "a string", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subject_from_single_key_map() {
        let subject = Subject::from_value(Some(&json!({ "post": { "id": 1 } }))).unwrap();
        assert_eq!(subject.type_name(), "post");
        assert_eq!(subject.entity_value(), Some(&json!({ "id": 1 })));
        assert_eq!(Subject::from(("post", json!({ "id": 1 }))), subject);
    }

    #[test]
    fn subject_from_type_string_has_no_entity() {
        let subject = Subject::from_value(Some(&json!("post"))).unwrap();
        assert_eq!(subject, Subject::of_type("post"));
        assert_eq!(subject.entity_value(), None);
    }

    #[test]
    fn subject_key_count_must_be_one() {
        for value in [json!({}), json!({ "a": 1, "b": 2 }), json!([])] {
            let err = Subject::from_value(Some(&value)).unwrap_err();
            assert!(matches!(err, PolicyError::InvalidShape { .. }), "{value}");
            assert!(err.to_string().contains("exactly one property"));
        }
    }

    #[test]
    fn subject_rejects_scalars() {
        for value in [None, Some(json!(null)), Some(json!(3)), Some(json!(true))] {
            let err = Subject::from_value(value.as_ref()).unwrap_err();
            assert_eq!(err.argument(), Some(Argument::Subject));
        }
    }

    #[test]
    fn actions_accept_strings_and_string_arrays() {
        assert_eq!(
            Actions::from_value(Some(&json!("edit"))).unwrap(),
            Actions::from("edit")
        );
        let batch = Actions::from_value(Some(&json!(["edit", "delete"]))).unwrap();
        assert_eq!(batch.iter().collect::<Vec<_>>(), ["edit", "delete"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn actions_reject_other_kinds_up_front() {
        for value in [None, Some(json!({})), Some(json!(4)), Some(json!(["edit", 4]))] {
            let err = Actions::from_value(value.as_ref()).unwrap_err();
            assert_eq!(err.argument(), Some(Argument::Actions));
        }
    }

    #[test]
    fn viewer_kinds() {
        assert!(check_viewer(None).is_ok());
        assert!(check_viewer(Some(&json!(null))).is_ok());
        assert!(check_viewer(Some(&json!({ "id": 1 }))).is_ok());
        assert!(check_viewer(Some(&json!([]))).is_ok());

        let err = check_viewer(Some(&json!("user"))).unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Viewer));
        assert!(err.to_string().contains("got string"));
    }
}
