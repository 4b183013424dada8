//! Lock-guarded store handle for hosts that check permissions from many threads.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::PolicyResult;
use crate::rule::Rule;
use crate::store::PolicyStore;
use crate::subject::{Actions, Subject};
use crate::table::PolicyTable;

/// Cloneable handle to one [`PolicyStore`] behind a single read/write lock.
///
/// Evaluations share the read lock; `define` and `undefine` take the write
/// lock. Predicates run while the read lock is held, so a predicate must not
/// call back into the same handle's mutating methods.
#[derive(Debug, Clone, Default)]
pub struct SharedPolicyStore {
    inner: Arc<RwLock<PolicyStore>>,
}

impl SharedPolicyStore {
    /// Wraps the supplied store.
    #[must_use]
    pub fn new(store: PolicyStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// See [`PolicyStore::evaluate`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`PolicyStore::evaluate`].
    ///
    /// # Panics
    ///
    /// Panics if the store lock has been poisoned.
    pub fn evaluate(
        &self,
        viewer: Option<&Value>,
        action: &str,
        subject: impl Into<Subject>,
    ) -> PolicyResult<bool> {
        let guard = self.inner.read().expect("policy store poisoned");
        guard.evaluate(viewer, action, subject)
    }

    /// See [`PolicyStore::define`].
    ///
    /// # Panics
    ///
    /// Panics if the store lock has been poisoned.
    pub fn define(
        &self,
        type_name: impl Into<String>,
        actions: impl Into<Actions>,
        rule: impl Into<Rule>,
    ) {
        let mut guard = self.inner.write().expect("policy store poisoned");
        guard.define(type_name, actions, rule);
    }

    /// See [`PolicyStore::undefine`].
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownType`](crate::PolicyError::UnknownType)
    /// when the type was never defined.
    ///
    /// # Panics
    ///
    /// Panics if the store lock has been poisoned.
    pub fn undefine(&self, type_name: &str, actions: impl Into<Actions>) -> PolicyResult<()> {
        let mut guard = self.inner.write().expect("policy store poisoned");
        guard.undefine(type_name, actions)
    }

    /// Returns true when the type has been defined.
    ///
    /// # Panics
    ///
    /// Panics if the store lock has been poisoned.
    #[must_use]
    pub fn knows_type(&self, type_name: &str) -> bool {
        let guard = self.inner.read().expect("policy store poisoned");
        guard.knows_type(type_name)
    }
}

impl From<PolicyStore> for SharedPolicyStore {
    fn from(store: PolicyStore) -> Self {
        Self::new(store)
    }
}

impl From<PolicyTable> for SharedPolicyStore {
    fn from(table: PolicyTable) -> Self {
        Self::new(PolicyStore::new(table))
    }
}
