// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The type boundary (§7.1): every phase's typed error converts into
//! [`TickFailure`] via `#[from]`, and [`TickFailure::code`] is the only
//! place in the engine that derives a [`Code`] from a phase failure. No
//! other function is allowed to invent a `(verdict, code)` pair by hand.

use crate::config_loader::ConfigError;
use crate::judge::{JudgeError, JudgeStop};
use crate::preflight::PreflightBlocked;
use crate::rollback::RollbackError;
use crate::verify::VerifyStop;
use thiserror::Error;
use tick_adapters::{BuilderError, PlannerDispatchError};
use tick_core::Code;
use tick_storage::LockError;
use tick_vcs::VcsError;

/// Every way a tick can fail to reach `SUCCESS`, collected behind one enum
/// so the tick engine always has exactly one place to ask "what code does
/// this map to".
#[derive(Debug, Error)]
pub enum TickFailure {
    #[error("lock: {0}")]
    Lock(#[from] LockError),
    #[error("preflight: {0}")]
    Preflight(#[from] PreflightBlocked),
    #[error("planner: {0}")]
    Planner(#[from] PlannerDispatchError),
    #[error("builder: {0}")]
    Builder(#[from] BuilderError),
    #[error("judge: {0}")]
    Judge(#[from] JudgeError),
    #[error("verify: {0}")]
    Verify(#[from] VerifyStop),
    #[error("rollback: {0}")]
    Rollback(#[from] RollbackError),
    #[error("vcs: {0}")]
    Vcs(#[from] VcsError),
    #[error("tick cancelled")]
    Cancelled,
    #[error("transport stall: {0}")]
    TransportStall(String),
}

impl From<ConfigError> for TickFailure {
    fn from(source: ConfigError) -> Self {
        TickFailure::Preflight(PreflightBlocked::Config(source))
    }
}

impl TickFailure {
    /// The closed-set code this failure is reported under (§6, §7.1).
    pub fn code(&self) -> Code {
        match self {
            TickFailure::Lock(_) => Code::BlockedLockHeld,
            TickFailure::Preflight(inner) => inner.code(),
            TickFailure::Planner(inner) => planner_error_code(inner),
            TickFailure::Builder(inner) => builder_error_code(inner),
            TickFailure::Judge(inner) => inner.code(),
            TickFailure::Verify(inner) => inner.code(),
            TickFailure::Rollback(_) => Code::StopInterrupted,
            TickFailure::Vcs(_) => Code::StopInterrupted,
            TickFailure::Cancelled => Code::StopInterrupted,
            TickFailure::TransportStall(_) => Code::BlockedTransportStalled,
        }
    }

    /// Whether the builder is known to have run by the time this failure
    /// occurred, and so rollback must be attempted (§4.10, §4.12).
    pub fn builder_ran(&self) -> bool {
        !matches!(
            self,
            TickFailure::Lock(_) | TickFailure::Preflight(_) | TickFailure::Planner(_)
        )
    }
}

fn planner_error_code(error: &PlannerDispatchError) -> Code {
    match error {
        PlannerDispatchError::Transport(_) => Code::BlockedTransportStalled,
        PlannerDispatchError::Invalid { .. } => Code::BlockedOrchestratorOutputInvalid,
    }
}

fn builder_error_code(error: &BuilderError) -> Code {
    match error {
        BuilderError::Timeout => Code::StopBuilderTimeout,
        BuilderError::PatchInvalidPath(_) => Code::StopPatchInvalidPath,
        BuilderError::PatchScopeViolation(_) => Code::StopPatchScopeViolation,
        BuilderError::PatchSymlink(_) => Code::StopPatchSymlink,
        BuilderError::PatchApplyFailed(_) => Code::StopPatchApplyFailed,
        BuilderError::Cancelled => Code::StopInterrupted,
        BuilderError::Exec(_)
        | BuilderError::OutputMissing(_)
        | BuilderError::OutputUnreadable { .. }
        | BuilderError::TaskFileUnwritable { .. } => Code::BlockedTransportStalled,
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
