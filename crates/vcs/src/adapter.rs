// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The version-control adapter (C3): every git invocation the engine needs,
//! built as argv-only [`tick_argv::Argv`] commands with `cwd` fixed to the
//! repository root — never a shell string, never string-interpolated from
//! task- or planner-derived content (P7).

use crate::parse::{self, NameStatusEntry, NumstatEntry, PorcelainEntry};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tick_argv::{Argv, CancelToken, Outcome};
use tick_core::touched::{BlastRadius, TouchedSet};

/// Default per-invocation timeout for git commands, distinct from the
/// planner/builder timeouts — git operations are local and should never
/// legitimately run long (§4.3 operations are all fast, read-mostly calls
/// plus one `reset --hard`).
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git {args:?} failed to execute: {source}")]
    Exec {
        args: Vec<String>,
        #[source]
        source: tick_argv::ExecError,
    },
    #[error("git {args:?} timed out")]
    Timeout { args: Vec<String> },
    #[error("git {args:?} was cancelled")]
    Cancelled { args: Vec<String> },
    #[error("git {args:?} exited {code:?}: {stderr}")]
    NonZeroExit {
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },
    #[error("HEAD is not a valid commit ref")]
    InvalidHead,
    #[error("not inside a git work tree")]
    NotARepo,
}

/// Runs git commands against a fixed repository root.
pub struct GitAdapter {
    repo_root: PathBuf,
    timeout: Duration,
}

impl GitAdapter {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    async fn run(&self, args: &[&str], cancel: &CancelToken) -> Result<String, VcsError> {
        let argv = Argv::new("git", &self.repo_root).args(args.iter().copied());
        let owned_args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let outcome = tick_argv::run(&argv, self.timeout, cancel)
            .await
            .map_err(|source| VcsError::Exec { args: owned_args.clone(), source })?;
        match outcome {
            Outcome::Completed(c) if c.success() => Ok(c.stdout_string()),
            Outcome::Completed(c) => Err(VcsError::NonZeroExit {
                args: owned_args,
                code: c.exit_code,
                stderr: c.stderr_string(),
            }),
            Outcome::TimedOut { .. } => Err(VcsError::Timeout { args: owned_args }),
            Outcome::Cancelled => Err(VcsError::Cancelled { args: owned_args }),
        }
    }

    /// `git rev-parse --is-inside-work-tree` (§4.3, §4.5 preflight check 2).
    pub async fn is_inside_work_tree(&self, cancel: &CancelToken) -> Result<bool, VcsError> {
        match self.run(&["rev-parse", "--is-inside-work-tree"], cancel).await {
            Ok(out) => Ok(out.trim() == "true"),
            Err(VcsError::NonZeroExit { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// `git rev-parse HEAD`: the base commit, captured once at preflight.
    pub async fn head(&self, cancel: &CancelToken) -> Result<String, VcsError> {
        let out = self.run(&["rev-parse", "HEAD"], cancel).await?;
        let head = out.trim().to_string();
        if head.is_empty() {
            return Err(VcsError::InvalidHead);
        }
        Ok(head)
    }

    /// `git status --porcelain`.
    pub async fn status_porcelain(&self, cancel: &CancelToken) -> Result<Vec<PorcelainEntry>, VcsError> {
        let out = self.run(&["status", "--porcelain"], cancel).await?;
        Ok(parse::parse_porcelain_status(&out))
    }

    /// `git diff --name-status <base>` against the working tree, not
    /// `<base>...HEAD`: the builder edits the working copy and never
    /// commits (patch mode runs `git apply`; HEAD only moves if a task
    /// itself commits), so a three-dot range against HEAD would miss
    /// every uncommitted modification, deletion, and rename of a tracked
    /// file. The two-arg form diffs `base`'s tree against the current
    /// index and worktree, which is what the judge needs to see.
    pub async fn diff_name_status(&self, base: &str, cancel: &CancelToken) -> Result<Vec<NameStatusEntry>, VcsError> {
        let out = self.run(&["diff", "--name-status", base], cancel).await?;
        Ok(parse::parse_name_status(&out))
    }

    /// `git diff --numstat <base>` against the working tree — the
    /// machine-parseable numeric form of "diff --stat" (§4.3's textual
    /// `--stat` is not reliably parseable; see DESIGN.md for this
    /// substitution). Same two-arg-vs-working-tree reasoning as
    /// [`Self::diff_name_status`].
    pub async fn diff_numstat(&self, base: &str, cancel: &CancelToken) -> Result<Vec<NumstatEntry>, VcsError> {
        let out = self.run(&["diff", "--numstat", base], cancel).await?;
        Ok(parse::parse_numstat(&out))
    }

    /// `git merge-base --is-ancestor <base> HEAD`: true iff `base` is an
    /// ancestor of (or equal to) the current HEAD.
    pub async fn is_ancestor(&self, base: &str, cancel: &CancelToken) -> Result<bool, VcsError> {
        let argv = Argv::new("git", &self.repo_root).args(["merge-base", "--is-ancestor", base, "HEAD"]);
        let outcome = tick_argv::run(&argv, self.timeout, cancel)
            .await
            .map_err(|source| VcsError::Exec { args: vec!["merge-base".into()], source })?;
        match outcome {
            Outcome::Completed(c) => Ok(c.success()),
            Outcome::TimedOut { .. } => Err(VcsError::Timeout { args: vec!["merge-base".into()] }),
            Outcome::Cancelled => Err(VcsError::Cancelled { args: vec!["merge-base".into()] }),
        }
    }

    /// `git reset --hard <base>`: restore all tracked files to `base`
    /// (§4.10 rollback step 1).
    pub async fn reset_hard(&self, base: &str, cancel: &CancelToken) -> Result<(), VcsError> {
        self.run(&["reset", "--hard", base], cancel).await?;
        Ok(())
    }

    /// Compute the touched set versus `base` (§3, §4.8): committed changes
    /// come from `diff --name-status`, untracked additions come from
    /// `status --porcelain` — the judge must see both, since a builder can
    /// leave scope-violating work uncommitted.
    pub async fn touched_set(&self, base: &str, cancel: &CancelToken) -> Result<TouchedSet, VcsError> {
        let mut touched = TouchedSet::default();
        for entry in self.diff_name_status(base, cancel).await? {
            match entry {
                NameStatusEntry::Modified(path) => touched.modified.push(path),
                NameStatusEntry::Added(path) => touched.added.push(path),
                NameStatusEntry::Deleted(path) => touched.deleted.push(path),
                NameStatusEntry::Renamed(from, to, _score) => touched.renamed.push((from, to)),
            }
        }
        for entry in self.status_porcelain(cancel).await? {
            if entry.is_untracked() {
                touched.untracked.push(entry.path);
            }
        }
        Ok(touched)
    }

    /// Compute the blast radius versus `base` (§3): `files_touched`/
    /// `new_files` come from the touched set (`all()`/`new_paths()`,
    /// deduplicated), line counts come from `diff --numstat`.
    pub async fn blast_radius(&self, base: &str, cancel: &CancelToken) -> Result<BlastRadius, VcsError> {
        let touched = self.touched_set(base, cancel).await?;
        let numstat = self.diff_numstat(base, cancel).await?;
        let lines_added = numstat.iter().map(|e| e.added).sum();
        let lines_deleted = numstat.iter().map(|e| e.deleted).sum();

        Ok(BlastRadius {
            files_touched: touched.all().len() as u32,
            lines_added,
            lines_deleted,
            new_files: touched.new_paths().len() as u32,
        })
    }

    /// `git diff <base>` against the working tree: the full unified diff
    /// text. Distinct from [`Self::diff_numstat`]'s machine-parseable line
    /// counts — this is the human-readable patch kept as the report's
    /// optional `diff.patch` history artifact (§4.11). Uses the same
    /// two-arg, working-tree-relative form as [`Self::diff_name_status`]
    /// so the artifact matches what the judge actually saw.
    pub async fn diff_patch(&self, base: &str, cancel: &CancelToken) -> Result<String, VcsError> {
        self.run(&["diff", base], cancel).await
    }

    /// Delete exactly the untracked paths named, never `git clean` (which
    /// would delete untracked paths the tick never introduced) — §4.10
    /// rollback step 2: "delete exactly the set of untracked paths the tick
    /// introduced".
    pub fn remove_untracked(&self, paths: &[String]) -> std::io::Result<()> {
        for path in paths {
            let full = self.repo_root.join(path);
            if full.is_dir() {
                let _ = std::fs::remove_dir_all(&full);
            } else if full.exists() || full.symlink_metadata().is_ok() {
                let _ = std::fs::remove_file(&full);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
