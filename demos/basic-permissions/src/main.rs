//! Walks through a small blog permission model.
//!
//! Run with `WARDEN_LOG=debug` to see every decision the store makes.

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};
use warden::policy::access::{prop, truthy};
use warden::telemetry::{TelemetryConfig, init_tracing};
use warden::{PolicyError, PolicyStore, PolicyTable, Rule, Subject};

fn main() -> Result<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let mut store = PolicyStore::new(
        PolicyTable::new()
            .with_rule(
                "post",
                "edit",
                Rule::predicate(|viewer, post| Ok(prop(viewer, "id")? == prop(post, "authorId")?)),
            )
            .with_rule(
                "post",
                "create",
                Rule::predicate(|viewer, _| Ok(truthy(prop(viewer, "id")?))),
            )
            .with_rule("post", "see", true),
    );

    info!("--- Checking the seeded rules ---");
    let author = json!({ "id": 2 });
    let stranger = json!({ "id": 3 });
    let post = Subject::entity("post", json!({ "authorId": 2 }));

    info!(allowed = store.evaluate(Some(&author), "edit", post.clone())?, "author edits own post");
    info!(allowed = store.evaluate(Some(&stranger), "edit", post.clone())?, "stranger edits post");
    info!(allowed = store.evaluate(None, "see", "post")?, "anonymous reads posts");
    info!(allowed = store.evaluate(Some(&stranger), "delete", "post")?, "stranger deletes post");

    info!("--- Changing the rules at runtime ---");
    let owner_only = store.rule("post", "edit").cloned().unwrap_or(Rule::Deny);
    store.define("post", ["delete", "archive"], owner_only);
    info!(allowed = store.evaluate(Some(&author), "delete", post.clone())?, "author deletes own post");
    store.undefine("post", ["delete", "archive"])?;
    info!(allowed = store.evaluate(Some(&author), "delete", post)?, "author deletes after undefine");

    info!("--- Calls the store rejects ---");
    match store.evaluate(Some(&author), "edit", "post") {
        Err(PolicyError::Rule(err)) => warn!(%err, "edit rule needs a post, not just its type"),
        other => info!(?other, "unexpected outcome"),
    }
    if let Err(err) = store.evaluate_value(Some(&author), Some(&json!("see")), Some(&json!({}))) {
        warn!(%err, "subject map without a type");
    }
    if let Err(err) = store.evaluate(Some(&author), "create", Subject::entity("tweet", json!({}))) {
        warn!(%err, "type never defined");
    }

    Ok(())
}
