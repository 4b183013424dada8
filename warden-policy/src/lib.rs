//! Per-type, per-action permission rules for embedding in host applications.
//!
//! A [`PolicyStore`] maps an entity type and an action to a [`Rule`]. Hosts
//! ask whether a viewer may act on a subject; viewers and entities are opaque
//! [`serde_json::Value`]s handed straight to predicate rules.
//!
//! ```
//! use serde_json::json;
//! use warden_policy::{access::prop, PolicyStore, PolicyTable, Rule, Subject};
//!
//! let store = PolicyStore::new(
//!     PolicyTable::new()
//!         .with_rule("post", "see", true)
//!         .with_rule("post", "edit", Rule::predicate(|viewer, post| {
//!             Ok(prop(viewer, "id")? == prop(post, "authorId")?)
//!         })),
//! );
//!
//! let viewer = json!({ "id": 2 });
//! let post = Subject::entity("post", json!({ "authorId": 2 }));
//! assert!(store.evaluate(Some(&viewer), "edit", post)?);
//! assert!(store.evaluate(None, "see", "post")?);
//! # Ok::<(), warden_policy::PolicyError>(())
//! ```

#![warn(missing_docs, clippy::pedantic)]

pub mod access;
mod error;
mod rule;
mod shared;
mod store;
mod subject;
mod table;

pub use error::{Argument, PolicyError, PolicyResult, RuleError, kind_of};
pub use rule::{PredicateFn, Rule, RuleKind};
pub use shared::SharedPolicyStore;
pub use store::PolicyStore;
pub use subject::{Actions, Subject};
pub use table::{ActionRules, PolicyTable};
