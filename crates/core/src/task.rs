// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The planner's output: a single proposed task, validated against the task
//! schema before the engine ever looks at it.

use crate::id::{MilestoneId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// What kind of work the planner is asking the builder to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Execute,
    VerifyOnly,
    Question,
}

/// A question raised by the planner instead of proposing an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Scope predicates the judge enforces against the touched set (§4.8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub allowed_globs: Vec<String>,
    #[serde(default)]
    pub forbidden_globs: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_new_files: bool,
    #[serde(default = "default_true")]
    pub allow_lockfile_changes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            allowed_globs: Vec::new(),
            forbidden_globs: Vec::new(),
            allow_new_files: true,
            allow_lockfile_changes: true,
        }
    }
}

/// Diff-size bounds the judge enforces (§4.8 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLimits {
    pub max_files_touched: u32,
    pub max_lines_changed: u32,
}

/// Per-template parameter map, keyed by template id.
pub type VerificationParams = HashMap<String, HashMap<String, String>>;

/// The verification templates the judge/verifier should run, by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSpec {
    #[serde(default)]
    pub fast: Vec<String>,
    #[serde(default)]
    pub slow: Vec<String>,
    #[serde(default)]
    pub params: VerificationParams,
}

/// Which builder flavor should carry out the task (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderMode {
    InteractiveAgent,
    Patch,
    ExternalDriver,
}

/// Builder dispatch parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSpec {
    pub mode: BuilderMode,
    pub max_turns: u32,
    pub instructions: String,
    #[serde(default)]
    pub patch: Option<String>,
}

/// A single proposed task, as validated against `task.schema.json`.
///
/// Immutable after acceptance: nothing downstream of the planner dispatcher
/// mutates a `Task` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub milestone_id: MilestoneId,
    pub task_kind: TaskKind,
    pub intent: String,
    #[serde(default)]
    pub question: Option<QuestionPayload>,
    #[serde(default)]
    pub scope: Scope,
    pub diff_limits: DiffLimits,
    #[serde(default)]
    pub verification: VerificationSpec,
    pub builder: BuilderSpec,
}

/// Semantic invariants that a JSON Schema can express only awkwardly (or
/// not at all) and so are re-checked in Rust after schema validation passes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskInvariantError {
    #[error("task_kind is `question` but no `question` payload was supplied")]
    QuestionPayloadMissing,
    #[error("task_kind is `question` but builder.mode is not `interactive_agent`")]
    QuestionRequiresInteractiveAgent,
    #[error("builder.mode is `patch` but no `builder.patch` was supplied")]
    PatchBodyMissing,
}

impl Task {
    /// Check the cross-field invariants from §3 that schema validation alone
    /// cannot enforce.
    pub fn check_invariants(&self) -> Result<(), TaskInvariantError> {
        if self.task_kind == TaskKind::Question {
            if self.question.is_none() {
                return Err(TaskInvariantError::QuestionPayloadMissing);
            }
            if self.builder.mode != BuilderMode::InteractiveAgent {
                return Err(TaskInvariantError::QuestionRequiresInteractiveAgent);
            }
        }
        if self.builder.mode == BuilderMode::Patch && self.builder.patch.is_none() {
            return Err(TaskInvariantError::PatchBodyMissing);
        }
        Ok(())
    }
}

/// The builder's advisory report of what it believes it did. Never a source
/// of truth — the judge derives the actual outcome from version-control
/// reality (§9, "subprocess result vs. truth").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub files_intended: Vec<String>,
    #[serde(default)]
    pub commands_ran: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Set by the lenient interactive-agent mode when the child's stdout
    /// did not parse as a `BuilderResult`; absent in strict mode and in the
    /// other builder flavors.
    #[serde(default)]
    pub builder_output_valid: Option<bool>,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
