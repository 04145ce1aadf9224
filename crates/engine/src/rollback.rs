// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollback (C10, §4.10): restore the working copy to `base_commit` after
//! any STOP or BLOCKED outcome that occurred once the builder ran. Recomputes
//! the touched set at rollback time rather than trusting the judge's earlier
//! snapshot, since the builder (or a stray process) may have kept writing
//! between the judge's read and the decision to roll back.

use thiserror::Error;
use tick_vcs::{GitAdapter, VcsError};
use tick_argv::CancelToken;

#[derive(Debug, Error)]
pub enum RollbackError {
    #[error("rollback: failed to read touched set: {0}")]
    TouchedSetUnreadable(#[source] VcsError),
    #[error("rollback: `git reset --hard` failed: {0}")]
    ResetFailed(#[source] VcsError),
    #[error("rollback: failed to remove untracked path(s): {0}")]
    UntrackedCleanupFailed(#[source] std::io::Error),
    #[error("rollback: worktree not clean after rollback: {remaining:?}")]
    NotClean { remaining: Vec<String> },
}

/// Restore the working copy to `base_commit` (§4.10 rollback steps 1–2) and
/// assert the result is clean (step 3: `git status --porcelain` empty).
pub async fn run(git: &GitAdapter, base_commit: &str, cancel: &CancelToken) -> Result<(), RollbackError> {
    let touched = git
        .touched_set(base_commit, cancel)
        .await
        .map_err(RollbackError::TouchedSetUnreadable)?;
    let untracked = touched.untracked.clone();

    git.reset_hard(base_commit, cancel).await.map_err(RollbackError::ResetFailed)?;

    git.remove_untracked(&untracked).map_err(RollbackError::UntrackedCleanupFailed)?;

    let status = git
        .status_porcelain(cancel)
        .await
        .map_err(RollbackError::TouchedSetUnreadable)?;
    if !status.is_empty() {
        return Err(RollbackError::NotClean {
            remaining: status.into_iter().map(|entry| entry.path).collect(),
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
