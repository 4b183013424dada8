//! Embeddable permission evaluator.
//!
//! Depend on this crate to get the policy store together with the tracing
//! setup helpers. Disable the `telemetry` feature when the host installs its
//! own subscriber.

#![warn(missing_docs, clippy::pedantic)]

/// Policy store, rules, and argument types.
pub use warden_policy as policy;

pub use warden_policy::{PolicyError, PolicyStore, PolicyTable, Rule, SharedPolicyStore, Subject};

/// Tracing subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use warden_telemetry as telemetry;
