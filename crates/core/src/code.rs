// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed report code set and the verdict each code uniquely determines.

use serde::{Deserialize, Serialize};

/// Coarse-grained outcome of a tick. `code` always determines `verdict` (P4);
/// this type exists only as the rendered summary field, never as an
/// independent source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Stop,
    Blocked,
}

/// The closed set of report codes. Adding a variant here is a schema
/// migration (see the design notes on schema evolution) — never add one
/// without updating every exhaustive match in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    Success,

    BlockedMissingConfig,
    BlockedDirtyWorktree,
    BlockedLockHeld,
    BlockedCrashRecoveryRequired,
    BlockedOrchestratorOutputInvalid,
    BlockedHistoryCapCleanupRequired,
    BlockedBudgetExhausted,
    BlockedTransportStalled,

    StopHeadMoved,
    StopRunnerOwnedMutation,
    StopScopeViolationForbidden,
    StopScopeViolationOutsideAllowed,
    StopScopeViolationNewFile,
    StopLockfileChangeForbidden,
    StopDiffTooLarge,
    StopVerifyOnlySideEffects,
    StopQuestionSideEffects,
    StopVerifyTainted,
    StopVerifyFlakyOrTimeout,
    StopVerifyFailedFast,
    StopVerifyFailedSlow,
    StopPatchInvalidPath,
    StopPatchScopeViolation,
    StopPatchSymlink,
    StopPatchApplyFailed,
    StopBuilderTimeout,
    StopInterrupted,
}

impl Code {
    /// The verdict this code uniquely determines (P4).
    pub fn verdict(self) -> Verdict {
        match self {
            Code::Success => Verdict::Success,

            Code::BlockedMissingConfig
            | Code::BlockedDirtyWorktree
            | Code::BlockedLockHeld
            | Code::BlockedCrashRecoveryRequired
            | Code::BlockedOrchestratorOutputInvalid
            | Code::BlockedHistoryCapCleanupRequired
            | Code::BlockedBudgetExhausted
            | Code::BlockedTransportStalled => Verdict::Blocked,

            Code::StopHeadMoved
            | Code::StopRunnerOwnedMutation
            | Code::StopScopeViolationForbidden
            | Code::StopScopeViolationOutsideAllowed
            | Code::StopScopeViolationNewFile
            | Code::StopLockfileChangeForbidden
            | Code::StopDiffTooLarge
            | Code::StopVerifyOnlySideEffects
            | Code::StopQuestionSideEffects
            | Code::StopVerifyTainted
            | Code::StopVerifyFlakyOrTimeout
            | Code::StopVerifyFailedFast
            | Code::StopVerifyFailedSlow
            | Code::StopPatchInvalidPath
            | Code::StopPatchScopeViolation
            | Code::StopPatchSymlink
            | Code::StopPatchApplyFailed
            | Code::StopBuilderTimeout
            | Code::StopInterrupted => Verdict::Stop,
        }
    }

    /// Whether this code is reached only if a builder ran (rollback-eligible).
    pub fn requires_rollback_if_builder_ran(self) -> bool {
        !matches!(self, Code::Success)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        match json.as_str() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
#[path = "code_tests.rs"]
mod tests;
