use super::*;
use chrono::Utc;
use tick_core::RunId;

#[test]
fn new_state_starts_in_lock_phase_with_nothing_accumulated() {
    let state = TickState::new(RunId::new("run-1"), Utc::now());
    assert_eq!(state.phase, Phase::Lock);
    assert!(state.base_commit.is_none());
    assert!(state.task.is_none());
    assert!(state.builder_result.is_none());
    assert!(state.errors.is_empty());
}

#[test]
fn enter_advances_the_phase_cursor() {
    let mut state = TickState::new(RunId::new("run-1"), Utc::now());
    state.enter(Phase::Preflight);
    assert_eq!(state.phase, Phase::Preflight);
    state.enter(Phase::Orchestrate);
    assert_eq!(state.phase, Phase::Orchestrate);
}

#[test]
fn phase_as_str_matches_the_spec_names() {
    assert_eq!(Phase::Lock.as_str(), "lock");
    assert_eq!(Phase::Preflight.as_str(), "preflight");
    assert_eq!(Phase::Orchestrate.as_str(), "orchestrate");
    assert_eq!(Phase::Build.as_str(), "build");
    assert_eq!(Phase::Judge.as_str(), "judge");
    assert_eq!(Phase::Verify.as_str(), "verify");
    assert_eq!(Phase::Report.as_str(), "report");
    assert_eq!(Phase::End.as_str(), "end");
}
