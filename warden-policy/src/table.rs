//! The type -> action -> rule mapping owned by a store.

use std::collections::HashMap;

use crate::rule::Rule;
use crate::subject::Actions;

/// Rules defined for one entity type, keyed by action name.
pub type ActionRules = HashMap<String, Rule>;

/// Mapping from entity type to its per-action rules.
///
/// A type counts as known once it has an entry, even an empty one.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    types: HashMap<String, ActionRules>,
}

impl PolicyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type with no actions.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.entry(type_name.into()).or_default();
        self
    }

    /// Adds a rule for a single action.
    #[must_use]
    pub fn with_rule(
        mut self,
        type_name: impl Into<String>,
        action: impl Into<String>,
        rule: impl Into<Rule>,
    ) -> Self {
        self.insert(type_name.into(), action.into(), rule.into());
        self
    }

    /// Adds the same rule for every listed action.
    #[must_use]
    pub fn with_actions(
        mut self,
        type_name: impl Into<String>,
        actions: impl Into<Actions>,
        rule: impl Into<Rule>,
    ) -> Self {
        let type_name = type_name.into();
        let rule = rule.into();
        for action in actions.into().iter() {
            self.insert(type_name.clone(), action.to_owned(), rule.clone());
        }
        self
    }

    /// Returns true when the type has an entry.
    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Returns the rules of a type, if the type is known.
    #[must_use]
    pub fn actions(&self, type_name: &str) -> Option<&ActionRules> {
        self.types.get(type_name)
    }

    /// Looks up the rule for a type/action pair.
    #[must_use]
    pub fn get(&self, type_name: &str, action: &str) -> Option<&Rule> {
        self.types.get(type_name)?.get(action)
    }

    /// Iterates over the known type names.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true when no type is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn insert(&mut self, type_name: String, action: String, rule: Rule) {
        self.ensure_type(type_name).insert(action, rule);
    }

    pub(crate) fn ensure_type(&mut self, type_name: String) -> &mut ActionRules {
        self.types.entry(type_name).or_default()
    }

    pub(crate) fn actions_mut(&mut self, type_name: &str) -> Option<&mut ActionRules> {
        self.types.get_mut(type_name)
    }
}

impl<T, A> FromIterator<(T, A, Rule)> for PolicyTable
where
    T: Into<String>,
    A: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, A, Rule)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (type_name, action, rule) in iter {
            table.insert(type_name.into(), action.into(), rule);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_types_are_known() {
        let table = PolicyTable::new().with_type("comment");
        assert!(table.contains_type("comment"));
        assert!(table.actions("comment").is_some_and(HashMap::is_empty));
        assert!(table.get("comment", "edit").is_none());
    }

    #[test]
    fn batch_builder_shares_the_rule() {
        let table = PolicyTable::new().with_actions("post", ["edit", "delete"], false);
        assert!(matches!(table.get("post", "edit"), Some(Rule::Deny)));
        assert!(matches!(table.get("post", "delete"), Some(Rule::Deny)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn collects_from_triples() {
        let table: PolicyTable = [("post", "see", Rule::Allow), ("user", "see", Rule::Deny)]
            .into_iter()
            .collect();
        assert_eq!(table.len(), 2);
        let mut names = table.type_names().collect::<Vec<_>>();
        names.sort_unstable();
        assert_eq!(names, ["post", "user"]);
    }
}
