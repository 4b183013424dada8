//! Rule representations stored per type/action pair.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Signature of host-supplied predicate rules.
///
/// The first argument is the viewer, the second the entity. Either may be
/// absent: the viewer when the caller passed none, the entity when the
/// subject was given as a bare type name.
pub type PredicateFn =
    dyn Fn(Option<&Value>, Option<&Value>) -> anyhow::Result<bool> + Send + Sync;

/// Describes the shape of a rule without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Always permitted.
    Allow,
    /// Never permitted.
    Deny,
    /// Decided by a predicate.
    Predicate,
}

impl RuleKind {
    /// Returns a lowercase label suitable for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Predicate => "predicate",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision logic for a single type/action pair.
#[derive(Clone)]
pub enum Rule {
    /// Action is permitted regardless of viewer or entity.
    Allow,
    /// Action is never permitted.
    Deny,
    /// Action is permitted when the predicate returns `Ok(true)`.
    Predicate(Arc<PredicateFn>),
}

impl Rule {
    /// Wraps a closure as a predicate rule.
    ///
    /// ```
    /// use warden_policy::{access::prop, Rule};
    ///
    /// let owns = Rule::predicate(|viewer, post| {
    ///     Ok(prop(viewer, "id")? == prop(post, "authorId")?)
    /// });
    /// assert!(owns.is_predicate());
    /// ```
    #[must_use]
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Value>, Option<&Value>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Returns the kind of the rule.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Allow => RuleKind::Allow,
            Self::Deny => RuleKind::Deny,
            Self::Predicate(_) => RuleKind::Predicate,
        }
    }

    /// Returns true for predicate rules.
    #[must_use]
    pub fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }

    /// Decides the rule for the supplied viewer and entity.
    ///
    /// # Errors
    ///
    /// Propagates whatever error a predicate rule returns.
    pub fn decide(&self, viewer: Option<&Value>, entity: Option<&Value>) -> anyhow::Result<bool> {
        match self {
            Self::Allow => Ok(true),
            Self::Deny => Ok(false),
            Self::Predicate(predicate) => predicate(viewer, entity),
        }
    }
}

impl From<bool> for Rule {
    fn from(value: bool) -> Self {
        if value { Self::Allow } else { Self::Deny }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Deny => f.write_str("Deny"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
