// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tick-schema: the schema validator (C2).
//!
//! Loads and caches compiled JSON Schema (draft 2020-12) documents and
//! validates arbitrary instances against them, normalizing every violation
//! into a [`SchemaViolation`] so the engine never has to special-case the
//! underlying validator's error shape.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// A single normalized schema violation (§4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub instance_path: String,
    pub keyword: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema file {path} not found")]
    Missing { path: PathBuf },
    #[error("schema file {path} unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema file {path} is not a valid JSON Schema: {message}")]
    Invalid { path: PathBuf, message: String },
    #[error("instance failed schema validation ({} violation(s))", .0.len())]
    Violations(Vec<SchemaViolation>),
}

/// Loads JSON Schema documents from disk on first use and keeps the
/// compiled validator around for the lifetime of the store, so a tick that
/// validates dozens of instances against the same schema only pays the
/// compile cost once.
#[derive(Default)]
pub struct SchemaStore {
    cache: RwLock<HashMap<PathBuf, std::sync::Arc<jsonschema::Validator>>>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, path: &Path) -> Result<std::sync::Arc<jsonschema::Validator>, SchemaError> {
        if let Some(existing) = self
            .cache
            .read()
            .expect("schema cache lock poisoned")
            .get(path)
        {
            return Ok(existing.clone());
        }

        if !path.exists() {
            return Err(SchemaError::Missing {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let schema_json: Value =
            serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let validator =
            jsonschema::validator_for(&schema_json).map_err(|error| SchemaError::Invalid {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
        let validator = std::sync::Arc::new(validator);
        self.cache
            .write()
            .expect("schema cache lock poisoned")
            .insert(path.to_path_buf(), validator.clone());
        Ok(validator)
    }

    /// Validate `instance` against the schema at `schema_path`, returning
    /// every violation rather than only the first, so the engine can put a
    /// complete list in `BLOCKED_ORCHESTRATOR_OUTPUT_INVALID` diagnostics.
    pub fn validate(&self, schema_path: &Path, instance: &Value) -> Result<(), SchemaError> {
        let validator = self.compiled(schema_path)?;
        let violations: Vec<SchemaViolation> = validator
            .iter_errors(instance)
            .map(|error| SchemaViolation {
                instance_path: error.instance_path.to_string(),
                keyword: format!("{:?}", error.kind),
                message: error.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Violations(violations))
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
