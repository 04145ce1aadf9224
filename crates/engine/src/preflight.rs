// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight (C5, §4.5): the six ordered checks a tick must clear before it
//! is allowed to consult the planner. Checks 1–2 share
//! `BLOCKED_MISSING_CONFIG` per §4.5 ("inside a version-controlled repo;
//! HEAD readable" uses the same code as "config present, parses,
//! validates") since both mean the same thing operationally: this
//! workspace is not in a state a tick can run in at all.
//!
//! Check 1 (config) is split into [`run_config_check`] because it runs
//! *before* the lock is acquired (the lockfile path itself lives in the
//! config) — see DESIGN.md for why preflight's own ordering in §2's
//! component table and §4.12's state machine read differently.

use crate::config_loader::{load_config, ConfigError};
use std::path::Path;
use thiserror::Error;
use tick_core::{Code, Config, MilestoneId, WorkspaceState};
use tick_schema::SchemaStore;
use tick_storage::HistoryStore;
use tick_vcs::{GitAdapter, VcsError};
use tick_argv::CancelToken;

/// Every way preflight can block a tick, one variant per §4.5 check (2–6;
/// check 1 is [`ConfigError`], folded in as [`PreflightBlocked::Config`]
/// so the whole ladder shares one error type).
#[derive(Debug, Error)]
pub enum PreflightBlocked {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("not inside a version-controlled repository")]
    NotARepo,
    #[error("HEAD is not readable: {0}")]
    HeadUnreadable(#[source] VcsError),
    #[error("worktree is dirty outside runner-owned paths: {violations:?}")]
    DirtyWorktree { violations: Vec<String> },
    #[error("history directory is {mb}MB, over the {cap_mb}MB cap")]
    HistoryCapExceeded { mb: u64, cap_mb: u64 },
    #[error("milestone {milestone_id:?} has exhausted its per-milestone budget")]
    BudgetExhausted { milestone_id: Option<MilestoneId> },
}

impl PreflightBlocked {
    pub fn code(&self) -> Code {
        match self {
            PreflightBlocked::Config(_) | PreflightBlocked::NotARepo | PreflightBlocked::HeadUnreadable(_) => {
                Code::BlockedMissingConfig
            }
            PreflightBlocked::DirtyWorktree { .. } => Code::BlockedDirtyWorktree,
            PreflightBlocked::HistoryCapExceeded { .. } => Code::BlockedHistoryCapCleanupRequired,
            PreflightBlocked::BudgetExhausted { .. } => Code::BlockedBudgetExhausted,
        }
    }
}

/// What a clean preflight pass hands to the rest of the tick.
#[derive(Debug, Clone, Default)]
pub struct PreflightOk {
    pub base_commit: String,
    pub warnings: Vec<String>,
}

/// Check 1 (§4.5): load and schema-validate `<config-file>`. Split out from
/// [`run_preflight`] because the lock path it needs to acquire lives inside
/// the config this check produces.
pub fn run_config_check(
    config_path: &Path,
    schema_store: &SchemaStore,
    config_schema_path: &Path,
) -> Result<Config, PreflightBlocked> {
    Ok(load_config(config_path, schema_store, config_schema_path)?)
}

/// Checks 2–6 (§4.5), given an already-loaded, already-validated config.
pub async fn run_preflight(
    config: &Config,
    git: &GitAdapter,
    history: &HistoryStore,
    state: &WorkspaceState,
    cancel: &CancelToken,
) -> Result<PreflightOk, PreflightBlocked> {
    let mut warnings = Vec::new();

    // Check 2: inside a repo, HEAD readable.
    if config.runner.require_git {
        let inside = git
            .is_inside_work_tree(cancel)
            .await
            .map_err(PreflightBlocked::HeadUnreadable)?;
        if !inside {
            return Err(PreflightBlocked::NotARepo);
        }
    }
    let base_commit = git.head(cancel).await.map_err(PreflightBlocked::HeadUnreadable)?;

    // Check 3: worktree clean, excluding runner-owned globs.
    let runner_owned = tick_core::compile_globs(&config.runner.runner_owned_globs)
        .map_err(|e| PreflightBlocked::DirtyWorktree { violations: vec![e.to_string()] })?;
    let status = git.status_porcelain(cancel).await.map_err(PreflightBlocked::HeadUnreadable)?;
    let dirty: Vec<String> = status
        .into_iter()
        .map(|entry| entry.path)
        .filter(|path| !tick_core::glob_matches_any(&runner_owned, path))
        .collect();
    if !dirty.is_empty() {
        return Err(PreflightBlocked::DirtyWorktree { violations: dirty });
    }

    // Check 4: tmp sweep, best-effort; never fails the tick on its own.
    if let Ok(glob) = globset::Glob::new(&config.runner.crash_cleanup.delete_tmp_glob) {
        match tick_storage::sweep_tmp_files(git.repo_root(), &glob.compile_matcher()) {
            Ok(removed) if removed > 0 => {
                warnings.push(format!("swept {removed} stale tmp file(s)"));
            }
            Ok(_) => {}
            Err(error) => warnings.push(format!("tmp sweep failed: {error}")),
        }
    }

    // Check 5: history cap. A failure to even measure the directory is
    // logged and treated as "empty" rather than blocking the tick — the
    // cap exists to bound disk usage, not to make a transient stat error
    // fatal.
    let mb = history.total_size_mb().unwrap_or_else(|error| {
        tracing::warn!(%error, "history size check failed, treating as 0MB");
        0
    });
    if mb > history_max_mb(config) {
        return Err(PreflightBlocked::HistoryCapExceeded {
            mb,
            cap_mb: history_max_mb(config),
        });
    }
    if history_max_mb(config) > 0 && mb as f64 >= history_max_mb(config) as f64 * 0.8 {
        warnings.push(format!("history directory at {mb}MB, nearing the {}MB cap", history_max_mb(config)));
    }

    // Check 6: per-milestone budget caps.
    if !state.within_budget(&config.budgets.per_milestone) {
        return Err(PreflightBlocked::BudgetExhausted {
            milestone_id: state.milestone_id.clone(),
        });
    }

    Ok(PreflightOk { base_commit, warnings })
}

fn history_max_mb(config: &Config) -> u64 {
    config.history.max_mb
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
