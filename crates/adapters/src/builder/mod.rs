// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The builder dispatcher (C7, §4.7): three builder flavors behind a single
//! [`BuilderOutcome`] result — interactive agent, unified-diff patch, and
//! external driver. The builder is never trusted to report success; every
//! flavor's result is advisory and may come back `None` on a soft failure,
//! since the judge (C8) derives the real outcome from version control.

pub mod external;
pub mod interactive;
pub mod patch;

use std::path::PathBuf;
use thiserror::Error;
use tick_core::BuilderResult;

/// What happened when the builder ran. `result` is the builder's own
/// self-report — advisory only (§9 "subprocess result vs. truth").
#[derive(Debug, Clone)]
pub enum BuilderOutcome {
    Ran { result: Option<BuilderResult> },
}

/// The raw result of one builder process invocation, before JSON extraction.
#[derive(Debug, Clone, Default)]
pub struct RawBuilderOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("failed to run builder process: {0}")]
    Exec(#[from] tick_argv::ExecError),
    #[error("builder process timed out")]
    Timeout,
    #[error("builder invocation cancelled")]
    Cancelled,
    #[error("patch referenced an invalid path: {0}")]
    PatchInvalidPath(String),
    #[error("patch path violates task scope: {0}")]
    PatchScopeViolation(String),
    #[error("patch path (or an ancestor) is a symbolic link: {0}")]
    PatchSymlink(String),
    #[error("patch failed to apply: {0}")]
    PatchApplyFailed(String),
    #[error("external driver output file {0} is missing")]
    OutputMissing(PathBuf),
    #[error("external driver output file {path} unreadable: {source}")]
    OutputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write external driver task file {path}: {source}")]
    TaskFileUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
