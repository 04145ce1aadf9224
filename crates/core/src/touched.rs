// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The touched set and blast radius: what the judge measures from
//! version-control reality, never from builder self-report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All paths changed versus `base_commit`, including untracked files.
///
/// Deleted paths are tracked for reporting but excluded from scope checks
/// (§3): a deletion cannot violate `allowed_globs`/`forbidden_globs` in a way
/// that matters to the judge, since nothing new was introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchedSet {
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    /// `(from, to)` pairs. Only `to` contributes to `all()`.
    pub renamed: Vec<(String, String)>,
    pub untracked: Vec<String>,
}

impl TouchedSet {
    /// `modified ∪ added ∪ renamed.to ∪ untracked`, deduplicated and sorted
    /// for deterministic reporting.
    pub fn all(&self) -> Vec<String> {
        let mut set: BTreeSet<String> = BTreeSet::new();
        set.extend(self.modified.iter().cloned());
        set.extend(self.added.iter().cloned());
        set.extend(self.renamed.iter().map(|(_, to)| to.clone()));
        set.extend(self.untracked.iter().cloned());
        set.into_iter().collect()
    }

    /// Paths that are newly introduced (added, untracked, or a rename
    /// destination) — used for `allow_new_files` enforcement.
    pub fn new_paths(&self) -> Vec<String> {
        let mut set: BTreeSet<String> = BTreeSet::new();
        set.extend(self.added.iter().cloned());
        set.extend(self.renamed.iter().map(|(_, to)| to.clone()));
        set.extend(self.untracked.iter().cloned());
        set.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.untracked.is_empty()
    }
}

/// Quantified impact of the tick on the working copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastRadius {
    pub files_touched: u32,
    pub lines_added: u32,
    pub lines_deleted: u32,
    pub new_files: u32,
}

#[cfg(test)]
#[path = "touched_tests.rs"]
mod tests;
