// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The planner dispatcher (C6, §4.6): invoke the planner process once,
//! extract its JSON task proposal, validate it against the task schema,
//! and — on a parse or validation failure — retry exactly once with the
//! failure reason appended to the prompt (P8: at most two invocations).

use crate::json_extract::{extract_json_object, extract_result_field};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tick_argv::{Argv, CancelToken, Outcome};
use tick_core::Task;
use tick_schema::{SchemaError, SchemaStore};

/// Parameters for one planner invocation, drawn from `planner_cli.*`,
/// `models.orchestrator`, and `orchestrator.*` config (§6).
#[derive(Debug, Clone)]
pub struct PlannerDispatchConfig {
    pub command: Vec<String>,
    pub model: String,
    pub permission_mode: String,
    pub max_turns: u32,
    pub timeout: Duration,
    pub max_parse_retries: u32,
    pub cwd: PathBuf,
}

/// The raw result of one planner process invocation, before any JSON
/// extraction — kept separate so debug artifacts (§4.6: "stdout, stderr,
/// extracted JSON, schema errors") can be written verbatim on failure.
#[derive(Debug, Clone, Default)]
pub struct RawPlannerOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("failed to run planner process: {0}")]
    Exec(#[from] tick_argv::ExecError),
    #[error("planner process timed out")]
    Timeout,
    #[error("planner invocation cancelled")]
    Cancelled,
}

/// One attempt's failure detail, carried into the retry prompt and, on
/// final failure, into the debug artifacts.
#[derive(Debug, Clone)]
pub struct PlannerAttemptFailure {
    pub raw: RawPlannerOutput,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum PlannerDispatchError {
    #[error("planner process failed: {0}")]
    Transport(#[from] PlannerError),
    #[error("planner output invalid after {attempts} attempt(s): {}", .failures.last().map(|f| f.reason.as_str()).unwrap_or(""))]
    Invalid {
        attempts: u32,
        failures: Vec<PlannerAttemptFailure>,
    },
}

/// Invokes a planner CLI process. Abstracted so the engine's tests can
/// substitute a [`fake::FakePlanner`] for a real subprocess.
#[async_trait]
pub trait PlannerProcess: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &PlannerDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawPlannerOutput, PlannerError>;
}

/// Invokes the configured planner CLI as an argv-only subprocess, passing
/// the assembled prompt as the final argv element (never via a shell
/// string, and never via stdin, so the single [`tick_argv::run`] primitive
/// covers every caller in this workspace).
pub struct ProcessPlanner;

#[async_trait]
impl PlannerProcess for ProcessPlanner {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &PlannerDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawPlannerOutput, PlannerError> {
        let (program, rest) = cfg
            .command
            .split_first()
            .expect("planner_cli.command is non-empty (schema-enforced)");
        let argv = Argv::new(program.clone(), cfg.cwd.clone())
            .args(rest.iter().cloned())
            .arg("--model")
            .arg(cfg.model.clone())
            .arg("--permission-mode")
            .arg(cfg.permission_mode.clone())
            .arg("--max-turns")
            .arg(cfg.max_turns.to_string())
            .arg(prompt.to_string());

        match tick_argv::run(&argv, cfg.timeout, cancel).await? {
            Outcome::Completed(c) => Ok(RawPlannerOutput {
                stdout: c.stdout_string(),
                stderr: c.stderr_string(),
                exit_code: c.exit_code,
            }),
            Outcome::TimedOut { .. } => Err(PlannerError::Timeout),
            Outcome::Cancelled => Err(PlannerError::Cancelled),
        }
    }
}

/// Build the retry prompt per §4.6: the original prompt, plus an appended
/// section naming why the previous attempt was rejected.
fn retry_prompt(base_prompt: &str, reason: &str) -> String {
    format!(
        "{base_prompt}\n\n---\nYour previous output was invalid: {reason}\nRespond with a single corrected JSON object matching the task schema, and nothing else.",
    )
}

/// Validate one planner attempt's raw output against the task schema and
/// the cross-field invariants schema validation cannot express.
fn validate_attempt(
    raw: &RawPlannerOutput,
    schema_store: &SchemaStore,
    task_schema_path: &Path,
) -> Result<Task, String> {
    let model_text = extract_result_field(&raw.stdout);
    let value = extract_json_object(&model_text)
        .ok_or_else(|| "no JSON object found in planner output".to_string())?;

    match schema_store.validate(task_schema_path, &value) {
        Ok(()) => {}
        Err(SchemaError::Violations(violations)) => {
            let joined = violations
                .iter()
                .map(|v| format!("{} ({}): {}", v.instance_path, v.keyword, v.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(format!("schema violations: {joined}"));
        }
        Err(other) => return Err(format!("schema validation error: {other}")),
    }

    let task: Task = serde_json::from_value(value)
        .map_err(|e| format!("deserialized but did not match Task shape: {e}"))?;
    task.check_invariants()
        .map_err(|e| format!("task invariant violated: {e}"))?;
    Ok(task)
}

/// Run the full planner dispatch (C6): build nothing itself — `prompt` is
/// assumed already assembled by the caller (template interpolation lives
/// with the config/workspace layer that owns the prompt template files) —
/// invoke, extract, validate, and retry at most once.
pub async fn dispatch_planner<P: PlannerProcess>(
    process: &P,
    schema_store: &SchemaStore,
    task_schema_path: &Path,
    prompt: &str,
    cfg: &PlannerDispatchConfig,
    cancel: &CancelToken,
) -> Result<Task, PlannerDispatchError> {
    let mut failures = Vec::new();
    let attempts = cfg.max_parse_retries + 1;

    for attempt in 0..attempts {
        let sent_prompt = match failures.last() {
            None => prompt.to_string(),
            Some(PlannerAttemptFailure { reason, .. }) => retry_prompt(prompt, reason),
        };

        let raw = process.invoke(&sent_prompt, cfg, cancel).await?;

        match validate_attempt(&raw, schema_store, task_schema_path) {
            Ok(task) => return Ok(task),
            Err(reason) => {
                tracing::warn!(attempt, reason = %reason, "planner output rejected");
                failures.push(PlannerAttemptFailure { raw, reason });
            }
        }
    }

    Err(PlannerDispatchError::Invalid {
        attempts,
        failures,
    })
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
