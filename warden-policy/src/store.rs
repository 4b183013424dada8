//! Policy store: owns the rule table and answers permission checks.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Argument, PolicyError, PolicyResult};
use crate::rule::{Rule, RuleKind};
use crate::subject::{Actions, Subject, check_viewer, expect_str};
use crate::table::PolicyTable;

/// In-memory store of per-type, per-action rules.
///
/// The store holds no lock. Mutation takes `&mut self`, so sharing one store
/// across threads needs external synchronization such as
/// [`SharedPolicyStore`](crate::SharedPolicyStore). Separate policy sets
/// should live in separate stores.
#[derive(Debug, Default)]
pub struct PolicyStore {
    table: PolicyTable,
}

impl PolicyStore {
    /// Creates a store that takes ownership of the supplied table.
    #[must_use]
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// Creates a store with no known types.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decides whether `viewer` may perform `action` on `subject`.
    ///
    /// Predicate rules receive the viewer and the entity exactly as passed;
    /// a bare type subject hands them no entity.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::InvalidArgument`] when the viewer is a scalar.
    /// - [`PolicyError::UnknownType`] when the subject's type was never defined.
    /// - [`PolicyError::Rule`] when a predicate fails; the error is not wrapped
    ///   or recovered.
    pub fn evaluate(
        &self,
        viewer: Option<&Value>,
        action: &str,
        subject: impl Into<Subject>,
    ) -> PolicyResult<bool> {
        check_viewer(viewer)?;
        let subject = subject.into();
        self.decide(viewer, action, &subject)
    }

    /// Evaluates loosely typed arguments, checking each one in call order.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidArgument`] naming the first argument of
    /// the wrong kind, [`PolicyError::InvalidShape`] for a subject map without
    /// exactly one key, then the errors of [`PolicyStore::evaluate`].
    pub fn evaluate_value(
        &self,
        viewer: Option<&Value>,
        action: Option<&Value>,
        subject: Option<&Value>,
    ) -> PolicyResult<bool> {
        check_viewer(viewer)?;
        let action = expect_str(action, Argument::Action)?;
        let subject = Subject::from_value(subject)?;
        self.decide(viewer, action, &subject)
    }

    /// Sets `rule` for every listed action of `type_name`, overwriting prior rules.
    ///
    /// The type becomes known even when the batch is empty.
    pub fn define(
        &mut self,
        type_name: impl Into<String>,
        actions: impl Into<Actions>,
        rule: impl Into<Rule>,
    ) {
        let type_name = type_name.into();
        let actions = actions.into();
        let rule = rule.into();
        debug!(
            type_name = %type_name,
            actions = actions.len(),
            rule = %rule.kind(),
            "defining policy rule"
        );

        let rules = self.table.ensure_type(type_name);
        for action in actions.iter() {
            rules.insert(action.to_owned(), rule.clone());
        }
    }

    /// Loosely typed form of [`PolicyStore::define`].
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidArgument`] when the type is not a string
    /// or the actions are not a string or an array of strings. Nothing is
    /// defined in that case.
    pub fn define_value(
        &mut self,
        type_name: Option<&Value>,
        actions: Option<&Value>,
        rule: impl Into<Rule>,
    ) -> PolicyResult<()> {
        let type_name = expect_str(type_name, Argument::Type)?.to_owned();
        let actions = Actions::from_value(actions)?;
        self.define(type_name, actions, rule);
        Ok(())
    }

    /// Removes the listed actions of `type_name`.
    ///
    /// Actions that were never defined are skipped. The type stays known.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownType`] when the type was never defined.
    pub fn undefine(&mut self, type_name: &str, actions: impl Into<Actions>) -> PolicyResult<()> {
        let actions = actions.into();
        let Some(rules) = self.table.actions_mut(type_name) else {
            warn!(type_name, "cannot undefine actions of unknown type");
            return Err(PolicyError::unknown_type(type_name));
        };

        let removed = actions
            .iter()
            .filter_map(|action| rules.remove(action))
            .count();
        debug!(type_name, removed, requested = actions.len(), "undefined policy rules");
        Ok(())
    }

    /// Loosely typed form of [`PolicyStore::undefine`].
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidArgument`] for arguments of the wrong
    /// kind, otherwise the errors of [`PolicyStore::undefine`].
    pub fn undefine_value(
        &mut self,
        type_name: Option<&Value>,
        actions: Option<&Value>,
    ) -> PolicyResult<()> {
        let type_name = expect_str(type_name, Argument::Type)?.to_owned();
        let actions = Actions::from_value(actions)?;
        self.undefine(&type_name, actions)
    }

    /// Returns true when the type has been defined.
    #[must_use]
    pub fn knows_type(&self, type_name: &str) -> bool {
        self.table.contains_type(type_name)
    }

    /// Returns the rule stored for a type/action pair.
    #[must_use]
    pub fn rule(&self, type_name: &str, action: &str) -> Option<&Rule> {
        self.table.get(type_name, action)
    }

    /// Returns the underlying table.
    #[must_use]
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Consumes the store and returns its table.
    #[must_use]
    pub fn into_table(self) -> PolicyTable {
        self.table
    }

    fn decide(&self, viewer: Option<&Value>, action: &str, subject: &Subject) -> PolicyResult<bool> {
        let type_name = subject.type_name();
        let Some(rules) = self.table.actions(type_name) else {
            warn!(type_name, action, "permission check against unknown type");
            return Err(PolicyError::unknown_type(type_name));
        };

        let (kind, allowed) = match rules.get(action) {
            Some(rule) => {
                let allowed = rule.decide(viewer, subject.entity_value()).inspect_err(|err| {
                    warn!(type_name, action, error = %err, "predicate rule failed");
                })?;
                (rule.kind(), allowed)
            }
            None => (RuleKind::Deny, false),
        };

        debug!(type_name, action, rule = %kind, allowed, "policy decision");
        Ok(allowed)
    }
}

impl From<PolicyTable> for PolicyStore {
    fn from(table: PolicyTable) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::prop;
    use serde_json::json;

    fn author_rule() -> Rule {
        Rule::predicate(|viewer, post| Ok(prop(viewer, "id")? == prop(post, "authorId")?))
    }

    #[test]
    fn missing_action_on_known_type_denies() {
        let store = PolicyStore::new(PolicyTable::new().with_type("post"));
        let viewer = json!({ "id": 1 });
        assert!(!store.evaluate(Some(&viewer), "delete", "post").unwrap());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let store = PolicyStore::empty();
        let err = store
            .evaluate(None, "create", Subject::entity("tweet", json!({})))
            .unwrap_err();
        assert!(matches!(err, PolicyError::UnknownType { ref type_name } if type_name == "tweet"));
    }

    #[test]
    fn scalar_viewer_is_rejected_before_lookup() {
        let store = PolicyStore::empty();
        let err = store.evaluate(Some(&json!("user")), "see", "post").unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Viewer));
    }

    #[test]
    fn define_overwrites_and_is_idempotent() {
        let mut store = PolicyStore::empty();
        store.define("post", "see", false);
        store.define("post", "see", true);
        store.define("post", "see", true);

        assert!(store.evaluate(None, "see", "post").unwrap());
        assert_eq!(store.table().actions("post").map(|rules| rules.len()), Some(1));
    }

    #[test]
    fn empty_batch_still_registers_type() {
        let mut store = PolicyStore::empty();
        store.define("draft", Vec::<String>::new(), true);
        assert!(store.knows_type("draft"));
        assert!(!store.evaluate(None, "see", "draft").unwrap());
    }

    #[test]
    fn undefine_keeps_type_known() {
        let mut store = PolicyStore::empty();
        store.define("post", ["edit", "delete"], author_rule());
        store.undefine("post", ["edit", "delete", "archive"]).unwrap();

        assert!(store.knows_type("post"));
        assert!(store.rule("post", "edit").is_none());
        let viewer = json!({ "id": 4 });
        let subject = Subject::entity("post", json!({ "authorId": 4 }));
        assert!(!store.evaluate(Some(&viewer), "edit", subject).unwrap());
    }

    #[test]
    fn undefine_unknown_type_fails() {
        let mut store = PolicyStore::empty();
        let err = store.undefine("post", "edit").unwrap_err();
        assert!(matches!(err, PolicyError::UnknownType { .. }));
    }

    #[test]
    fn value_forms_validate_in_order() {
        let mut store = PolicyStore::empty();
        store.define("post", "see", true);

        let err = store
            .evaluate_value(Some(&json!(3)), None, None)
            .unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Viewer));

        let err = store
            .evaluate_value(Some(&json!({})), Some(&json!(3)), None)
            .unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Action));

        let err = store
            .evaluate_value(Some(&json!({})), Some(&json!("see")), Some(&json!(3)))
            .unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Subject));

        assert!(
            store
                .evaluate_value(None, Some(&json!("see")), Some(&json!("post")))
                .unwrap()
        );
    }

    #[test]
    fn define_value_rejects_before_mutating() {
        let mut store = PolicyStore::empty();
        let err = store
            .define_value(Some(&json!(4)), Some(&json!("edit")), true)
            .unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Type));

        let err = store
            .define_value(Some(&json!("post")), Some(&json!(["edit", 4])), true)
            .unwrap_err();
        assert_eq!(err.argument(), Some(Argument::Actions));
        assert!(!store.knows_type("post"));
    }

    #[test]
    fn into_table_returns_owned_rules() {
        let mut store = PolicyStore::from(PolicyTable::new().with_rule("post", "see", true));
        store.define("post", "edit", author_rule());

        let table = store.into_table();
        assert!(matches!(table.get("post", "see"), Some(Rule::Allow)));
        assert!(table.get("post", "edit").is_some_and(Rule::is_predicate));
    }
}
