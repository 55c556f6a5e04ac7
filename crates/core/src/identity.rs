//! Fact identity
//!
//! Canonicalizes a fact's discriminating key/value pairs into a stable,
//! order-independent identifier. The identity is the sink's primary key:
//! re-exporting the same observation must overwrite, never duplicate.

use quader_domain::constants::{is_identity_meta_key, is_meta_key};
use quader_domain::types::is_structured;
use quader_domain::Fact;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the deterministic identity of a normalized fact.
///
/// Contributing pairs are every non-metadata key plus the re-included
/// bookkeeping keys (`id`, `date`, `year`, `cube`): two facts differing
/// only in region, date or cube are distinct records. A structured value
/// (measure wrapper, list) contributes only its key name: the observed
/// quantity does not discriminate identity, the coordinates do. Pairs are
/// rendered as `key:value`, sorted lexicographically, concatenated and
/// hashed with SHA-256.
pub fn compute_fact_id(fact: &Fact) -> String {
    let mut parts: Vec<String> = fact
        .iter()
        .filter(|(key, _)| !is_meta_key(key) || is_identity_meta_key(key))
        .map(|(key, value)| {
            if is_structured(value) {
                key.clone()
            } else {
                format!("{key}:{}", render_scalar(value))
            }
        })
        .collect();
    parts.sort_unstable();

    let mut hasher = Sha256::new();
    for part in &parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
