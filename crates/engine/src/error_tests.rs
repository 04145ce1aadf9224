use super::*;
use chrono::Utc;
use tick_adapters::planner::PlannerAttemptFailure;
use tick_adapters::{PlannerError, RawPlannerOutput};
use tick_core::{Code, RunId};
use tick_vcs::VcsError;

#[test]
fn planner_transport_failure_maps_to_transport_stalled() {
    let error = PlannerDispatchError::Transport(PlannerError::Timeout);
    let failure = TickFailure::Planner(error);
    assert_eq!(failure.code(), Code::BlockedTransportStalled);
    assert!(!failure.builder_ran());
}

#[test]
fn planner_invalid_output_maps_to_orchestrator_output_invalid() {
    let error = PlannerDispatchError::Invalid {
        attempts: 2,
        failures: vec![PlannerAttemptFailure {
            raw: RawPlannerOutput {
                stdout: "not json".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
            reason: "malformed JSON".to_string(),
        }],
    };
    let failure = TickFailure::Planner(error);
    assert_eq!(failure.code(), Code::BlockedOrchestratorOutputInvalid);
}

#[test]
fn builder_timeout_maps_to_stop_builder_timeout_and_counts_as_ran() {
    let failure = TickFailure::Builder(BuilderError::Timeout);
    assert_eq!(failure.code(), Code::StopBuilderTimeout);
    assert!(failure.builder_ran());
}

#[test]
fn lock_held_never_counts_as_builder_ran() {
    let failure = TickFailure::Lock(LockError::Held {
        pid: 1,
        started_at: Utc::now(),
    });
    assert_eq!(failure.code(), Code::BlockedLockHeld);
    assert!(!failure.builder_ran());
}

#[test]
fn vcs_failure_maps_to_stop_interrupted_and_counts_as_ran() {
    let failure = TickFailure::Vcs(VcsError::NonZeroExit {
        args: vec!["status".to_string()],
        code: Some(128),
        stderr: "fatal: not a git repository".to_string(),
    });
    assert_eq!(failure.code(), Code::StopInterrupted);
    assert!(failure.builder_ran());
}

#[test]
fn cancelled_maps_to_stop_interrupted() {
    let failure = TickFailure::Cancelled;
    assert_eq!(failure.code(), Code::StopInterrupted);
}

#[test]
fn transport_stall_maps_to_blocked_transport_stalled() {
    let failure = TickFailure::TransportStall("tick exceeded max_tick_seconds".to_string());
    assert_eq!(failure.code(), Code::BlockedTransportStalled);
}

#[test]
fn run_id_unused_import_guard() {
    // Keeps `RunId` available for future additions without an unused-import warning
    // if a test above is trimmed.
    let _ = RunId::new("unused");
}
