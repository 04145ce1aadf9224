//! Preflight gating specs (§4.5): every BLOCKED outcome that a tick can
//! hit before it ever dispatches a planner, verified end to end through
//! the compiled binary rather than through the engine's own unit tests.

use crate::prelude::*;
use chrono::Utc;

#[test]
fn missing_config_blocks_before_any_engine_work() {
    let project = Project::bare();

    let output = project.run_tick();

    output.assert_exit_code(2).assert_stderr_has("not found");
    assert!(!project.report_json_path().exists(), "no report should be written without a config");
}

#[test]
fn dirty_worktree_outside_runner_owned_globs_blocks() {
    let project = Project::new();
    project.file("scratch.txt", "uncommitted\n");

    let output = project.run_tick();

    output.assert_exit_code(2).assert_stdout_has("BLOCKED_DIRTY_WORKTREE");

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(project.report_json_path()).expect("report.json")).expect("valid json");
    assert_eq!(report["code"], "BLOCKED_DIRTY_WORKTREE");
    assert_eq!(report["verdict"], "blocked");
}

#[test]
fn lock_held_by_a_live_process_in_the_same_boot_blocks_without_touching_the_planner() {
    let project = Project::new();
    let record = tick_storage::LockRecord {
        pid: std::process::id(),
        started_at: Utc::now(),
        boot_id: tick_storage::boot_id(),
    };
    std::fs::write(project.lock_json_path(), serde_json::to_string(&record).unwrap()).unwrap();

    let output = project.run_tick();

    output.assert_exit_code(2).assert_stdout_has("BLOCKED_LOCK_HELD");
    // A lock-held outcome precedes lock acquisition, so nothing is written
    // under the workspace — the lock record on disk is left untouched.
    assert!(!project.report_json_path().exists());
    let on_disk = std::fs::read_to_string(project.lock_json_path()).unwrap();
    let on_disk: tick_storage::LockRecord = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(on_disk.pid, record.pid);
}
