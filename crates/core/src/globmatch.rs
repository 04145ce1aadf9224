// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one glob-matching implementation shared by scope enforcement (judge,
//! patch-mode path validation) and runner-owned-path checks: case-sensitive
//! pathname-style matching (`**`/`*`/`?`/character classes) against
//! repo-relative, forward-slash paths.
//!
//! **Decision**: a trailing `/` on a pattern is treated as equivalent to
//! appending `**`, so `"build/"` matches everything under `build/` the same
//! way `"build/**"` would.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid glob pattern {pattern:?}: {source}")]
pub struct GlobMatchError {
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

/// Compile `patterns` into a single matchable set.
pub fn compile(patterns: &[String]) -> Result<GlobSet, GlobMatchError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let normalized = if let Some(prefix) = pattern.strip_suffix('/') {
            format!("{prefix}/**")
        } else {
            pattern.clone()
        };
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| GlobMatchError {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| GlobMatchError {
        pattern: patterns.join(","),
        source,
    })
}

/// Normalize a path to repo-relative, forward-slash, no leading `./`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    replaced.strip_prefix("./").unwrap_or(&replaced).to_string()
}

pub fn matches_any(set: &GlobSet, path: &str) -> bool {
    set.is_match(normalize_path(path))
}

#[cfg(test)]
#[path = "globmatch_tests.rs"]
mod tests;
