// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::planner::fake::FakePlanner;
use serde_json::json;
use tempfile::tempdir;

fn dispatch_cfg() -> PlannerDispatchConfig {
    PlannerDispatchConfig {
        command: vec!["planner".to_string()],
        model: "m".to_string(),
        permission_mode: "default".to_string(),
        max_turns: 1,
        timeout: Duration::from_secs(1),
        max_parse_retries: 1,
        cwd: std::env::temp_dir(),
    }
}

fn minimal_task_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["task_id", "milestone_id", "task_kind", "intent", "diff_limits", "builder"],
        "properties": {
            "task_kind": { "enum": ["execute", "verify_only", "question"] }
        }
    })
}

fn valid_task_json() -> serde_json::Value {
    json!({
        "task_id": "t-1",
        "milestone_id": "m-1",
        "task_kind": "execute",
        "intent": "add a function",
        "scope": { "allowed_globs": ["src/**"] },
        "diff_limits": { "max_files_touched": 5, "max_lines_changed": 200 },
        "verification": { "fast": [], "slow": [] },
        "builder": { "mode": "interactive_agent", "max_turns": 3, "instructions": "do it" }
    })
}

fn wrapper(result_text: &str) -> String {
    json!({ "type": "result", "subtype": "success", "result": result_text }).to_string()
}

#[tokio::test]
async fn accepts_a_valid_task_on_the_first_attempt() {
    let dir = tempdir().unwrap();
    let schema_path = dir.path().join("task.schema.json");
    std::fs::write(&schema_path, serde_json::to_vec(&minimal_task_schema()).unwrap()).unwrap();

    let raw = RawPlannerOutput {
        stdout: wrapper(&valid_task_json().to_string()),
        stderr: String::new(),
        exit_code: Some(0),
    };
    let planner = FakePlanner::new(vec![raw]);
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let task = dispatch_planner(&planner, &store, &schema_path, "base prompt", &dispatch_cfg(), &cancel)
        .await
        .unwrap();

    assert_eq!(task.task_id.as_str(), "t-1");
    assert_eq!(planner.call_count(), 1);
}

#[tokio::test]
async fn retries_once_with_reason_appended_then_succeeds() {
    let dir = tempdir().unwrap();
    let schema_path = dir.path().join("task.schema.json");
    std::fs::write(&schema_path, serde_json::to_vec(&minimal_task_schema()).unwrap()).unwrap();

    let bad = RawPlannerOutput {
        stdout: wrapper("not json at all"),
        stderr: String::new(),
        exit_code: Some(0),
    };
    let good = RawPlannerOutput {
        stdout: wrapper(&valid_task_json().to_string()),
        stderr: String::new(),
        exit_code: Some(0),
    };
    let planner = FakePlanner::new(vec![bad, good]);
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let task = dispatch_planner(&planner, &store, &schema_path, "base prompt", &dispatch_cfg(), &cancel)
        .await
        .unwrap();

    assert_eq!(task.task_id.as_str(), "t-1");
    let prompts = planner.prompts_seen();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("previous output was invalid"));
}

#[tokio::test]
async fn fails_with_invalid_after_exhausting_the_single_retry() {
    let dir = tempdir().unwrap();
    let schema_path = dir.path().join("task.schema.json");
    std::fs::write(&schema_path, serde_json::to_vec(&minimal_task_schema()).unwrap()).unwrap();

    let bad = RawPlannerOutput {
        stdout: wrapper("still not json"),
        stderr: String::new(),
        exit_code: Some(0),
    };
    let planner = FakePlanner::new(vec![bad.clone(), bad]);
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let result = dispatch_planner(&planner, &store, &schema_path, "base prompt", &dispatch_cfg(), &cancel).await;

    assert_eq!(planner.call_count(), 2);
    match result {
        Err(PlannerDispatchError::Invalid { attempts, failures }) => {
            assert_eq!(attempts, 2);
            assert_eq!(failures.len(), 2);
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn rejects_a_task_that_violates_a_cross_field_invariant() {
    let dir = tempdir().unwrap();
    let schema_path = dir.path().join("task.schema.json");
    std::fs::write(&schema_path, serde_json::to_vec(&minimal_task_schema()).unwrap()).unwrap();

    // Schema-valid but violates Task::check_invariants: task_kind=question with no
    // question payload.
    let mut bad_task = valid_task_json();
    bad_task["task_kind"] = json!("question");
    let raw = RawPlannerOutput {
        stdout: wrapper(&bad_task.to_string()),
        stderr: String::new(),
        exit_code: Some(0),
    };
    let planner = FakePlanner::new(vec![raw.clone(), raw]);
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let result = dispatch_planner(&planner, &store, &schema_path, "base prompt", &dispatch_cfg(), &cancel).await;
    assert!(matches!(result, Err(PlannerDispatchError::Invalid { .. })));
}
