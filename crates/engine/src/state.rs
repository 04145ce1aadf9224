// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory, process-scoped tick state (§3): the state machine's phase
//! cursor plus everything accumulated along the way. Never persisted as-is
//! — [`crate::report_writer`] projects the terminal state into the
//! canonical [`tick_core::Report`].

use chrono::{DateTime, Utc};
use tick_core::{BuilderResult, RunId, Task};

/// `phase ∈ {LOCK, PREFLIGHT, ORCHESTRATE, BUILD, JUDGE, VERIFY, REPORT, END}`
/// (§3). `Verify` and `Report` are named out explicitly even though §3's
/// prose collapses them, since the engine's state machine (§4.12) treats
/// them as distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lock,
    Preflight,
    Orchestrate,
    Build,
    Judge,
    Verify,
    Report,
    End,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Lock => "lock",
            Phase::Preflight => "preflight",
            Phase::Orchestrate => "orchestrate",
            Phase::Build => "build",
            Phase::Judge => "judge",
            Phase::Verify => "verify",
            Phase::Report => "report",
            Phase::End => "end",
        }
    }
}

/// The tick's in-memory record as it moves through the state machine.
#[derive(Debug, Clone)]
pub struct TickState {
    pub run_id: RunId,
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
    pub base_commit: Option<String>,
    pub task: Option<Task>,
    pub builder_result: Option<BuilderResult>,
    pub errors: Vec<String>,
}

impl TickState {
    pub fn new(run_id: RunId, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            phase: Phase::Lock,
            started_at,
            base_commit: None,
            task: None,
            builder_result: None,
            errors: Vec::new(),
        }
    }

    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
