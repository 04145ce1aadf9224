// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace state: the small piece of memory that persists across ticks,
//! atomically owned by the runner (§3, §4.15).

use crate::code::Verdict;
use crate::id::{MilestoneId, RunId};
use serde::{Deserialize, Serialize};

/// Running counters against the configured per-milestone budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Budgets {
    #[serde(default)]
    pub ticks: u32,
    #[serde(default)]
    pub orchestrator_calls: u32,
    #[serde(default)]
    pub builder_calls: u32,
    #[serde(default)]
    pub verify_runs: u32,
    #[serde(default)]
    pub estimated_cost_usd: f64,
}

impl Budgets {
    pub const fn zero() -> Self {
        Self {
            ticks: 0,
            orchestrator_calls: 0,
            builder_calls: 0,
            verify_runs: 0,
            estimated_cost_usd: 0.0,
        }
    }
}

/// Persisted, runner-owned workspace state. Read once at the start of a
/// tick and written back once at the end (§4.15); never touched by the
/// planner or builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,
    #[serde(default)]
    pub budgets: Budgets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_id: Option<RunId>,
    #[serde(default)]
    pub history_run_count: u32,
    /// Set once any budget counter has crossed `warn_at_fraction` of its cap
    /// (§4.16); cleared when the milestone resets.
    #[serde(default)]
    pub budget_warning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verdict: Option<Verdict>,
    /// Cross-tick retry counter driving the degradation ladder (§4.12):
    /// 0 → unchanged config, 1 → degraded config, ≥2 → block.
    #[serde(default)]
    pub retry_count: u32,
}

impl WorkspaceState {
    /// Switch to a new milestone, zeroing the budget counters (§3: "resetting
    /// `milestone_id` zeroes the budget counters").
    pub fn set_milestone(&mut self, milestone_id: MilestoneId) {
        if self.milestone_id.as_ref() != Some(&milestone_id) {
            self.budgets = Budgets::zero();
            self.budget_warning = false;
            self.retry_count = 0;
        }
        self.milestone_id = Some(milestone_id);
    }

    /// Record the end of a tick: bump `ticks` and `last_run_id`.
    pub fn record_tick(&mut self, run_id: RunId) {
        self.budgets.ticks += 1;
        self.last_run_id = Some(run_id);
    }

    /// Recompute `budget_warning` against `warn_at_fraction` of each cap
    /// (§4.16). Never clears the flag once any counter has crossed it within
    /// the current milestone; only a milestone change resets it.
    pub fn update_budget_warning(&mut self, caps: &crate::config::PerMilestoneBudgets, warn_at_fraction: f64) {
        let b = &self.budgets;
        let crossed = (b.ticks as f64) >= caps.max_ticks as f64 * warn_at_fraction
            || (b.orchestrator_calls as f64) >= caps.max_orchestrator_calls as f64 * warn_at_fraction
            || (b.builder_calls as f64) >= caps.max_builder_calls as f64 * warn_at_fraction
            || (b.verify_runs as f64) >= caps.max_verify_runs as f64 * warn_at_fraction
            || b.estimated_cost_usd >= caps.max_estimated_cost_usd * warn_at_fraction;
        if crossed {
            self.budget_warning = true;
        }
    }

    /// Whether every counter is still strictly under its cap (§4.5 preflight
    /// check 6).
    pub fn within_budget(&self, caps: &crate::config::PerMilestoneBudgets) -> bool {
        let b = &self.budgets;
        b.ticks < caps.max_ticks
            && b.orchestrator_calls < caps.max_orchestrator_calls
            && b.builder_calls < caps.max_builder_calls
            && b.verify_runs < caps.max_verify_runs
            && b.estimated_cost_usd < caps.max_estimated_cost_usd
    }
}

#[cfg(test)]
#[path = "workspace_state_tests.rs"]
mod tests;
