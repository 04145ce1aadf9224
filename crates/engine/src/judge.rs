// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The judge (C8, §4.8): runs strictly after the builder phase and derives
//! the tick's real outcome from version-control reality, never from the
//! builder's own advisory report (§9 "subprocess result vs. truth").

use thiserror::Error;
use tick_core::{BlastRadius, Code, Config, DiffLimits, Scope, ScopeReport, Task, TaskKind, TouchedSet};
use tick_vcs::{GitAdapter, VcsError};
use tick_argv::CancelToken;

/// Everything a clean judge pass hands to verification and the report
/// writer.
#[derive(Debug, Clone)]
pub struct JudgeOutcome {
    pub touched: TouchedSet,
    pub blast_radius: BlastRadius,
    pub scope: ScopeReport,
}

/// One of §4.8's ordered stop conditions. Carries enough detail for the
/// report's `scope.violations[]`.
#[derive(Debug, Error, Clone)]
pub enum JudgeStop {
    #[error("HEAD moved from base commit and base is not an ancestor of HEAD")]
    HeadMoved,
    #[error("runner-owned path(s) mutated: {paths:?}")]
    RunnerOwnedMutation { paths: Vec<String> },
    #[error("forbidden-glob path(s) touched: {paths:?}")]
    ScopeViolationForbidden { paths: Vec<String> },
    #[error("path(s) outside allowed_globs: {paths:?}")]
    ScopeViolationOutsideAllowed { paths: Vec<String> },
    #[error("new file(s) introduced though allow_new_files=false: {paths:?}")]
    ScopeViolationNewFile { paths: Vec<String> },
    #[error("lockfile change(s) though allow_lockfile_changes=false: {paths:?}")]
    LockfileChangeForbidden { paths: Vec<String> },
    #[error("diff too large: files={files_touched}/{max_files} lines={lines_changed}/{max_lines}")]
    DiffTooLarge {
        files_touched: u32,
        max_files: u32,
        lines_changed: u32,
        max_lines: u32,
    },
    #[error("verify_only task produced a diff")]
    VerifyOnlySideEffects,
    #[error("question task produced a diff")]
    QuestionSideEffects,
}

/// Either a judge-decided stop, or a genuine VCS failure (a git invocation
/// that errored rather than merely reporting HEAD drift) — kept distinct so
/// the tick engine can tell "the judge ruled STOP" apart from "git itself
/// is broken", which maps to a different code entirely (§7.1).
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(transparent)]
    Stop(#[from] JudgeStop),
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

impl JudgeError {
    pub fn code(&self) -> Code {
        match self {
            JudgeError::Stop(inner) => inner.code(),
            JudgeError::Vcs(_) => Code::StopInterrupted,
        }
    }
}

impl JudgeStop {
    pub fn code(&self) -> Code {
        match self {
            JudgeStop::HeadMoved => Code::StopHeadMoved,
            JudgeStop::RunnerOwnedMutation { .. } => Code::StopRunnerOwnedMutation,
            JudgeStop::ScopeViolationForbidden { .. } => Code::StopScopeViolationForbidden,
            JudgeStop::ScopeViolationOutsideAllowed { .. } => Code::StopScopeViolationOutsideAllowed,
            JudgeStop::ScopeViolationNewFile { .. } => Code::StopScopeViolationNewFile,
            JudgeStop::LockfileChangeForbidden { .. } => Code::StopLockfileChangeForbidden,
            JudgeStop::DiffTooLarge { .. } => Code::StopDiffTooLarge,
            JudgeStop::VerifyOnlySideEffects => Code::StopVerifyOnlySideEffects,
            JudgeStop::QuestionSideEffects => Code::StopQuestionSideEffects,
        }
    }
}

/// Layer the task's own `scope` block on top of the workspace-wide
/// `scope.*` defaults (§3: "a task's own `scope` block layers on top of"):
/// allowed/forbidden globs are unioned, `allow_new_files`/
/// `allow_lockfile_changes` both have to permit for the merged scope to.
pub fn effective_scope(config: &Config, task_scope: &Scope) -> Scope {
    let mut allowed_globs = config.scope.default_allowed_globs.clone();
    allowed_globs.extend(task_scope.allowed_globs.iter().cloned());
    let mut forbidden_globs = config.scope.default_forbidden_globs.clone();
    forbidden_globs.extend(task_scope.forbidden_globs.iter().cloned());

    Scope {
        allowed_globs,
        forbidden_globs,
        allow_new_files: config.scope.default_allow_new_files && task_scope.allow_new_files,
        allow_lockfile_changes: config.scope.default_allow_lockfile_changes && task_scope.allow_lockfile_changes,
    }
}

/// Run the full judge pass (§4.8, steps 1–5) against version-control
/// reality.
pub async fn run(
    task: &Task,
    config: &Config,
    git: &GitAdapter,
    base_commit: &str,
    cancel: &CancelToken,
) -> Result<JudgeOutcome, JudgeError> {
    // Step 1: HEAD drift. A non-zero exit from `merge-base --is-ancestor`
    // means "not an ancestor", which is the drift condition itself, not a
    // tool failure — everything else is a genuine VCS error.
    let is_ancestor = match git.is_ancestor(base_commit, cancel).await {
        Ok(is_ancestor) => is_ancestor,
        Err(VcsError::NonZeroExit { .. }) => false,
        Err(source) => return Err(JudgeError::Vcs(source)),
    };
    if !is_ancestor {
        return Err(JudgeError::Stop(JudgeStop::HeadMoved));
    }

    // Step 2: touched set.
    let touched = git.touched_set(base_commit, cancel).await?;
    let all_paths = touched.all();

    // Step 3: scope check, first match wins.
    let runner_owned = tick_core::compile_globs(&config.runner.runner_owned_globs).unwrap_or_default();
    let runner_owned_hits: Vec<String> = all_paths
        .iter()
        .filter(|p| tick_core::glob_matches_any(&runner_owned, p))
        .cloned()
        .collect();
    if !runner_owned_hits.is_empty() {
        return Err(JudgeError::Stop(JudgeStop::RunnerOwnedMutation { paths: runner_owned_hits }));
    }

    let scope = effective_scope(config, &task.scope);

    if !scope.forbidden_globs.is_empty() {
        let forbidden = tick_core::compile_globs(&scope.forbidden_globs).unwrap_or_default();
        let hits: Vec<String> = all_paths.iter().filter(|p| tick_core::glob_matches_any(&forbidden, p)).cloned().collect();
        if !hits.is_empty() {
            return Err(JudgeError::Stop(JudgeStop::ScopeViolationForbidden { paths: hits }));
        }
    }

    if !scope.allowed_globs.is_empty() {
        let allowed = tick_core::compile_globs(&scope.allowed_globs).unwrap_or_default();
        let outside: Vec<String> = all_paths.iter().filter(|p| !tick_core::glob_matches_any(&allowed, p)).cloned().collect();
        if !outside.is_empty() {
            return Err(JudgeError::Stop(JudgeStop::ScopeViolationOutsideAllowed { paths: outside }));
        }
    }

    if !scope.allow_new_files {
        let new_paths = touched.new_paths();
        if !new_paths.is_empty() {
            return Err(JudgeError::Stop(JudgeStop::ScopeViolationNewFile { paths: new_paths }));
        }
    }

    if !scope.allow_lockfile_changes && !config.scope.lockfiles.is_empty() {
        let lockfiles = tick_core::compile_globs(&config.scope.lockfiles).unwrap_or_default();
        let hits: Vec<String> = all_paths.iter().filter(|p| tick_core::glob_matches_any(&lockfiles, p)).cloned().collect();
        if !hits.is_empty() {
            return Err(JudgeError::Stop(JudgeStop::LockfileChangeForbidden { paths: hits }));
        }
    }

    // Step 4: diff limits.
    let blast_radius = git.blast_radius(base_commit, cancel).await?;
    let lines_changed = blast_radius.lines_added + blast_radius.lines_deleted;
    let DiffLimits { max_files_touched, max_lines_changed } = task.diff_limits;
    if blast_radius.files_touched > max_files_touched || lines_changed > max_lines_changed {
        return Err(JudgeError::Stop(JudgeStop::DiffTooLarge {
            files_touched: blast_radius.files_touched,
            max_files: max_files_touched,
            lines_changed,
            max_lines: max_lines_changed,
        }));
    }

    // Step 5: side-effect guards.
    let has_diff = !touched.is_empty();
    match task.task_kind {
        TaskKind::VerifyOnly if has_diff => return Err(JudgeError::Stop(JudgeStop::VerifyOnlySideEffects)),
        TaskKind::Question if has_diff => return Err(JudgeError::Stop(JudgeStop::QuestionSideEffects)),
        _ => {}
    }

    Ok(JudgeOutcome {
        scope: ScopeReport {
            ok: true,
            violations: Vec::new(),
            touched_paths: all_paths,
        },
        touched,
        blast_radius,
    })
}

#[cfg(test)]
#[path = "judge_tests.rs"]
mod tests;
