// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tempfile::tempdir;

struct ScriptedProcess {
    raw: RawBuilderOutput,
}

#[async_trait]
impl InteractiveBuilderProcess for ScriptedProcess {
    async fn invoke(
        &self,
        _prompt: &str,
        _cfg: &InteractiveDispatchConfig,
        _cancel: &CancelToken,
    ) -> Result<RawBuilderOutput, BuilderError> {
        Ok(self.raw.clone())
    }
}

fn cfg(strict: bool) -> InteractiveDispatchConfig {
    InteractiveDispatchConfig {
        command: vec!["builder".to_string()],
        model: "m".to_string(),
        permission_mode: "default".to_string(),
        allowed_tools: vec!["Edit".to_string()],
        max_turns: 5,
        timeout: Duration::from_secs(1),
        strict_builder_json: strict,
        cwd: std::env::temp_dir(),
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

#[test]
fn clamp_max_turns_never_exceeds_the_ceiling() {
    assert_eq!(clamp_max_turns(10, 5), 5);
    assert_eq!(clamp_max_turns(3, 5), 3);
}

#[tokio::test]
async fn valid_json_response_is_parsed_into_a_builder_result() {
    let dir = tempdir().unwrap();
    let schema_path = result_schema_path(&dir);
    let wrapper = json!({
        "result": json!({ "summary": "did the thing", "files_intended": ["a.rs"] }).to_string()
    })
    .to_string();
    let process = ScriptedProcess {
        raw: RawBuilderOutput { stdout: wrapper, stderr: String::new(), exit_code: Some(0) },
    };
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let outcome = dispatch_interactive(&process, &store, &schema_path, "prompt", &cfg(true), &cancel)
        .await
        .unwrap();

    match outcome {
        BuilderOutcome::Ran { result: Some(r) } => assert_eq!(r.summary, "did the thing"),
        other => panic!("expected Ran with a result, got {other:?}"),
    }
}

#[tokio::test]
async fn strict_mode_invalid_json_yields_no_advisory_result() {
    let dir = tempdir().unwrap();
    let schema_path = result_schema_path(&dir);
    let process = ScriptedProcess {
        raw: RawBuilderOutput { stdout: "not json".to_string(), stderr: String::new(), exit_code: Some(0) },
    };
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let outcome = dispatch_interactive(&process, &store, &schema_path, "prompt", &cfg(true), &cancel)
        .await
        .unwrap();

    assert!(matches!(outcome, BuilderOutcome::Ran { result: None }));
}

#[tokio::test]
async fn lenient_mode_invalid_json_synthesizes_an_invalid_flagged_result() {
    let dir = tempdir().unwrap();
    let schema_path = result_schema_path(&dir);
    let process = ScriptedProcess {
        raw: RawBuilderOutput { stdout: "not json".to_string(), stderr: String::new(), exit_code: Some(0) },
    };
    let store = SchemaStore::new();
    let cancel = CancelToken::new();

    let outcome = dispatch_interactive(&process, &store, &schema_path, "prompt", &cfg(false), &cancel)
        .await
        .unwrap();

    match outcome {
        BuilderOutcome::Ran { result: Some(r) } => assert_eq!(r.builder_output_valid, Some(false)),
        other => panic!("expected a synthesized invalid result, got {other:?}"),
    }
}
