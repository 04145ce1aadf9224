// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn set_milestone_zeroes_budgets_on_change() {
    let mut state = WorkspaceState {
        budgets: Budgets {
            ticks: 3,
            orchestrator_calls: 2,
            builder_calls: 2,
            verify_runs: 1,
            estimated_cost_usd: 1.5,
        },
        milestone_id: Some(MilestoneId::new("m1")),
        ..Default::default()
    };
    state.set_milestone(MilestoneId::new("m2"));
    assert_eq!(state.budgets, Budgets::zero());
    assert_eq!(state.milestone_id, Some(MilestoneId::new("m2")));
}

#[test]
fn set_milestone_preserves_budgets_when_unchanged() {
    let mut state = WorkspaceState {
        budgets: Budgets {
            ticks: 3,
            ..Default::default()
        },
        milestone_id: Some(MilestoneId::new("m1")),
        ..Default::default()
    };
    state.set_milestone(MilestoneId::new("m1"));
    assert_eq!(state.budgets.ticks, 3);
}

#[test]
fn record_tick_increments_counter_and_last_run() {
    let mut state = WorkspaceState::default();
    state.record_tick(RunId::new("r1"));
    assert_eq!(state.budgets.ticks, 1);
    assert_eq!(state.last_run_id, Some(RunId::new("r1")));
    state.record_tick(RunId::new("r2"));
    assert_eq!(state.budgets.ticks, 2);
    assert_eq!(state.last_run_id, Some(RunId::new("r2")));
}

#[test]
fn set_milestone_resets_budget_warning_and_retry_count_on_change() {
    let mut state = WorkspaceState {
        budget_warning: true,
        retry_count: 2,
        milestone_id: Some(MilestoneId::new("m1")),
        ..Default::default()
    };
    state.set_milestone(MilestoneId::new("m2"));
    assert!(!state.budget_warning);
    assert_eq!(state.retry_count, 0);
}

fn caps() -> crate::config::PerMilestoneBudgets {
    crate::config::PerMilestoneBudgets {
        max_ticks: 10,
        max_orchestrator_calls: 10,
        max_builder_calls: 10,
        max_verify_runs: 10,
        max_estimated_cost_usd: 10.0,
    }
}

#[test]
fn update_budget_warning_sets_flag_once_a_counter_crosses_the_fraction() {
    let mut state = WorkspaceState {
        budgets: Budgets { ticks: 8, ..Default::default() },
        ..Default::default()
    };
    state.update_budget_warning(&caps(), 0.8);
    assert!(state.budget_warning);
}

#[test]
fn update_budget_warning_leaves_flag_unset_below_the_fraction() {
    let mut state = WorkspaceState {
        budgets: Budgets { ticks: 1, ..Default::default() },
        ..Default::default()
    };
    state.update_budget_warning(&caps(), 0.8);
    assert!(!state.budget_warning);
}

#[test]
fn within_budget_is_false_once_any_counter_reaches_its_cap() {
    let state = WorkspaceState {
        budgets: Budgets { builder_calls: 10, ..Default::default() },
        ..Default::default()
    };
    assert!(!state.within_budget(&caps()));
}
