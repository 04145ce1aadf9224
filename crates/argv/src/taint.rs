// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Taint validation for parameter values substituted into verification
//! command argv (§4.9). Every value must clear this gate *before* any
//! command in the batch runs — a single tainted parameter fails the whole
//! batch with zero subprocesses executed (scenario 6, §8).

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mirrors `verification.*` from config: the knobs that decide whether a
/// parameter value is safe to substitute into an argv element.
#[derive(Debug, Clone)]
pub struct TaintPolicy {
    pub max_param_len: usize,
    pub reject_whitespace: bool,
    pub reject_dotdot: bool,
    pub metachar_regex: Regex,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaintError {
    #[error("parameter `{name}` is {len} characters, over the {max} limit")]
    TooLong { name: String, len: usize, max: usize },
    #[error("parameter `{name}` contains whitespace")]
    Whitespace { name: String },
    #[error("parameter `{name}` contains `..`")]
    DotDot { name: String },
    #[error("parameter `{name}` matches a disallowed shell metacharacter")]
    Metachar { name: String },
    #[error("parameter `{name}` resolves outside the repository root")]
    OutsideRoot { name: String },
}

impl TaintPolicy {
    /// Validate a single parameter value. Path-typed parameters additionally
    /// must resolve under `repo_root` when `is_path` is set by the caller —
    /// the policy itself doesn't know which parameters are path-shaped,
    /// since that's a property of the verification template, not the value.
    pub fn validate(&self, name: &str, value: &str) -> Result<(), TaintError> {
        if value.len() > self.max_param_len {
            return Err(TaintError::TooLong {
                name: name.to_string(),
                len: value.len(),
                max: self.max_param_len,
            });
        }
        if self.reject_whitespace && value.chars().any(char::is_whitespace) {
            return Err(TaintError::Whitespace { name: name.to_string() });
        }
        if self.reject_dotdot && value.contains("..") {
            return Err(TaintError::DotDot { name: name.to_string() });
        }
        if self.metachar_regex.is_match(value) {
            return Err(TaintError::Metachar { name: name.to_string() });
        }
        Ok(())
    }

    /// Additional check for parameters the template marks as path-shaped:
    /// the resolved path must stay under `repo_root`.
    pub fn validate_path(&self, name: &str, value: &str, repo_root: &Path) -> Result<(), TaintError> {
        self.validate(name, value)?;
        let resolved: PathBuf = repo_root.join(value);
        let normalized = normalize_lexically(&resolved);
        let root_normalized = normalize_lexically(repo_root);
        if !normalized.starts_with(&root_normalized) {
            return Err(TaintError::OutsideRoot { name: name.to_string() });
        }
        Ok(())
    }
}

/// Lexical `..`/`.` collapse without touching the filesystem (the path need
/// not exist — verification params are validated before any command runs).
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Substitute `{{name}}` placeholders in `args` by exact string replacement.
/// Never touches the program name (§4.9: "substitute `{{param}}` placeholders
/// by exact replacement in args (never cmd)").
pub fn substitute_params(args: &[String], params: &std::collections::HashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut out = arg.clone();
            for (key, value) in params {
                out = out.replace(&format!("{{{{{key}}}}}"), value);
            }
            out
        })
        .collect()
}

#[cfg(test)]
#[path = "taint_tests.rs"]
mod tests;
