// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical task fingerprinting (P10): a hash over a task's semantic
//! fields that is invariant to JSON key ordering and incidental whitespace,
//! so the same logical task always fingerprints the same way regardless of
//! how the planner happened to format it.

use crate::task::Task;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Recursively re-order object keys so that structurally identical values
/// serialize identically regardless of source field order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(ordered.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// A stable, lowercase hex SHA-256 fingerprint of a task's semantic fields.
///
/// Two tasks that are equal after canonicalization produce the same
/// fingerprint even if the planner emitted their JSON with different key
/// order or whitespace.
pub fn task_fingerprint(task: &Task) -> String {
    let value = serde_json::to_value(task).unwrap_or(Value::Null);
    let canonical = canonicalize(&value);
    let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    format!("{digest:x}")
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
