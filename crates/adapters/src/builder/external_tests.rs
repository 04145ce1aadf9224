// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::sync::Mutex;
use tempfile::tempdir;
use tick_core::{BuilderMode, BuilderSpec, DiffLimits, MilestoneId, Scope, TaskId, TaskKind, VerificationSpec};

fn sample_task() -> Task {
    Task {
        task_id: TaskId::new("t1"),
        milestone_id: MilestoneId::new("m1"),
        task_kind: TaskKind::Execute,
        intent: "do the thing".to_string(),
        question: None,
        scope: Scope::default(),
        diff_limits: DiffLimits { max_files_touched: 10, max_lines_changed: 100 },
        verification: VerificationSpec::default(),
        builder: BuilderSpec {
            mode: BuilderMode::ExternalDriver,
            max_turns: 1,
            instructions: "do it".to_string(),
            patch: None,
        },
    }
}

fn result_schema_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object"
    });
    let path = dir.path().join("builder_result.schema.json");
    std::fs::write(&path, serde_json::to_vec(&schema).unwrap()).unwrap();
    path
}

struct RecordingDriver {
    writes_output: bool,
    invocations: Mutex<u32>,
}

#[async_trait]
impl ExternalDriverProcess for RecordingDriver {
    async fn invoke(&self, cfg: &ExternalDispatchConfig, _cancel: &CancelToken) -> Result<RawBuilderOutput, BuilderError> {
        *self.invocations.lock().unwrap() += 1;
        if self.writes_output {
            let body = json!({ "summary": "driver finished", "files_intended": ["out.rs"] });
            std::fs::write(cfg.workspace_root.join(&cfg.output_file), serde_json::to_vec(&body).unwrap()).unwrap();
        }
        Ok(RawBuilderOutput { stdout: String::new(), stderr: String::new(), exit_code: Some(0) })
    }
}

#[tokio::test]
async fn dispatch_external_writes_the_task_file_before_invoking_the_driver() {
    let dir = tempdir().unwrap();
    let schema_path = result_schema_path(&dir);
    let cfg = ExternalDispatchConfig {
        command: vec!["driver".to_string()],
        args: vec![],
        timeout: Duration::from_secs(5),
        output_file: "out.json".to_string(),
        workspace_root: dir.path().to_path_buf(),
    };
    let driver = RecordingDriver { writes_output: true, invocations: Mutex::new(0) };
    let store = SchemaStore::new();
    let cancel = CancelToken::new();
    let task = sample_task();

    let outcome = dispatch_external(&driver, &store, &schema_path, &task, &cfg, &cancel).await.unwrap();

    assert!(dir.path().join(TASK_FILE_NAME).exists());
    assert_eq!(*driver.invocations.lock().unwrap(), 1);
    match outcome {
        BuilderOutcome::Ran { result: Some(r) } => assert_eq!(r.summary, "driver finished"),
        other => panic!("expected Ran with a result, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_external_treats_a_missing_output_file_as_a_soft_failure() {
    let dir = tempdir().unwrap();
    let schema_path = result_schema_path(&dir);
    let cfg = ExternalDispatchConfig {
        command: vec!["driver".to_string()],
        args: vec![],
        timeout: Duration::from_secs(5),
        output_file: "out.json".to_string(),
        workspace_root: dir.path().to_path_buf(),
    };
    let driver = RecordingDriver { writes_output: false, invocations: Mutex::new(0) };
    let store = SchemaStore::new();
    let cancel = CancelToken::new();
    let task = sample_task();

    let outcome = dispatch_external(&driver, &store, &schema_path, &task, &cfg, &cancel).await.unwrap();

    assert!(matches!(outcome, BuilderOutcome::Ran { result: None }));
}
