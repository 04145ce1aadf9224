// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The config loader & validator (A1, §4.13): read `<config-file>` through
//! the atomic store's JSON helper, validate the raw value against
//! `config.schema.json` before ever deserializing it into [`Config`], then
//! hand back a typed, already-validated configuration.
//!
//! Defaults for optional keys are applied by `serde(default = ...)` on
//! [`Config`] itself, not baked into the schema — the schema stays a pure
//! shape contract (§4.13).

use std::path::{Path, PathBuf};
use thiserror::Error;
use tick_core::Config;
use tick_schema::{SchemaError, SchemaStore, SchemaViolation};

/// Typed config-load failure (§3.1). Never propagated as a bare string —
/// the preflight phase maps every variant to `BLOCKED_MISSING_CONFIG`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}: not found")]
    Missing(PathBuf),
    #[error("{path}: unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: malformed JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config failed schema validation ({} violation(s))", .0.len())]
    Schema(Vec<SchemaViolation>),
}

/// Load and validate `<config-file>` at `config_path`, against the schema
/// at `schema_path`.
///
/// Schema validation happens on the raw [`serde_json::Value`], before the
/// value is ever deserialized into [`Config`], so a config that is valid
/// JSON but violates the shape contract (e.g. a negative diff limit) is
/// reported with the same normalized [`SchemaViolation`] shape C6/C7 use
/// for task/builder-result errors.
pub fn load_config(config_path: &Path, schema_store: &SchemaStore, schema_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::Missing(config_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Unreadable {
        path: config_path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })?;

    match schema_store.validate(schema_path, &value) {
        Ok(()) => {}
        Err(SchemaError::Violations(violations)) => return Err(ConfigError::Schema(violations)),
        Err(SchemaError::Missing { path }) => {
            return Err(ConfigError::Schema(vec![SchemaViolation {
                instance_path: String::new(),
                keyword: "$schema".to_string(),
                message: format!("schema file {} not found", path.display()),
            }]))
        }
        Err(other) => {
            return Err(ConfigError::Schema(vec![SchemaViolation {
                instance_path: String::new(),
                keyword: "$schema".to_string(),
                message: other.to_string(),
            }]))
        }
    }

    serde_json::from_value(value).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "config_loader_tests.rs"]
mod tests;
