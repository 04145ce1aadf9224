// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical report: the one artifact every tick unconditionally emits.

use crate::code::{Code, Verdict};
use crate::id::{MilestoneId, RunId};
use crate::touched::BlastRadius;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope-check outcome (§4.8 step 3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeReport {
    pub ok: bool,
    #[serde(default)]
    pub violations: Vec<String>,
    #[serde(default)]
    pub touched_paths: Vec<String>,
}

/// Diff-size outcome (§4.8 step 4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub files_changed: u32,
    pub lines_changed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_path: Option<String>,
}

/// Classification of a single verification command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Pass,
    Fail,
    Timeout,
}

/// Which phase a verification run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPhase {
    Fast,
    Slow,
}

/// Record of one executed verification command, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRunRecord {
    pub template_id: String,
    pub phase: VerificationPhase,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// All verification activity for the tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub exec_mode: String,
    #[serde(default)]
    pub runs: Vec<VerificationRunRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
}

/// Budget counters and warnings, scoped to the active milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,
    pub ticks: u32,
    pub orchestrator_calls: u32,
    pub builder_calls: u32,
    pub verify_runs: u32,
    pub estimated_cost_usd: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Debug/history artifact pointers, populated on non-success outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner_debug_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_debug_dir: Option<String>,
}

/// The canonical, schema-validated report for a single tick.
///
/// `code` is the only field the engine ever decides directly; `verdict` is
/// always derived from it via [`Code::verdict`] so the two can never
/// disagree (P4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub base_commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_commit: Option<String>,
    pub task_summary: String,
    pub verdict: Verdict,
    pub code: Code,
    pub blast_radius: BlastRadius,
    pub scope: ScopeReport,
    pub diff: DiffReport,
    pub verification: VerificationReport,
    pub budgets: BudgetsReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointers: Option<Pointers>,
}

impl Report {
    /// Build a report, deriving `verdict` from `code` so the invariant in
    /// §3 ("code uniquely determines verdict") holds by construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: RunId,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        base_commit: String,
        head_commit: Option<String>,
        task_summary: String,
        code: Code,
        blast_radius: BlastRadius,
        scope: ScopeReport,
        diff: DiffReport,
        verification: VerificationReport,
        budgets: BudgetsReport,
        pointers: Option<Pointers>,
    ) -> Self {
        let duration_ms = (ended_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            run_id,
            started_at,
            ended_at,
            duration_ms,
            base_commit,
            head_commit,
            task_summary,
            verdict: code.verdict(),
            code,
            blast_radius,
            scope,
            diff,
            verification,
            budgets,
            pointers,
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
