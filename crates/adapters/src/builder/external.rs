// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-driver builder mode (§4.7): the task is written to a known
//! workspace path, a driver process is spawned out-of-band, and its result
//! is read back from a configured output path. The driver is an arbitrary
//! external program; tick never inspects what it does beyond its exit code
//! and the file it leaves behind.

use super::{BuilderError, BuilderOutcome, RawBuilderOutput};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tick_argv::{Argv, CancelToken, Outcome};
use tick_core::{BuilderResult, Task};
use tick_schema::SchemaStore;

/// Name of the file the task is serialized to under the workspace root
/// before the driver is spawned.
pub const TASK_FILE_NAME: &str = "tick-task.json";

#[derive(Debug, Clone)]
pub struct ExternalDispatchConfig {
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub output_file: String,
    pub workspace_root: PathBuf,
}

#[async_trait]
pub trait ExternalDriverProcess: Send + Sync {
    async fn invoke(&self, cfg: &ExternalDispatchConfig, cancel: &CancelToken) -> Result<RawBuilderOutput, BuilderError>;
}

pub struct ProcessExternalDriver;

#[async_trait]
impl ExternalDriverProcess for ProcessExternalDriver {
    async fn invoke(&self, cfg: &ExternalDispatchConfig, cancel: &CancelToken) -> Result<RawBuilderOutput, BuilderError> {
        let (program, rest) = cfg
            .command
            .split_first()
            .expect("builder.external.command is non-empty (schema-enforced)");
        let argv = Argv::new(program.clone(), cfg.workspace_root.clone())
            .args(rest.iter().cloned())
            .args(cfg.args.iter().cloned());

        match tick_argv::run(&argv, cfg.timeout, cancel).await? {
            Outcome::Completed(c) => Ok(RawBuilderOutput {
                stdout: c.stdout_string(),
                stderr: c.stderr_string(),
                exit_code: c.exit_code,
            }),
            Outcome::TimedOut { .. } => Err(BuilderError::Timeout),
            Outcome::Cancelled => Err(BuilderError::Cancelled),
        }
    }
}

fn task_file_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(TASK_FILE_NAME)
}

fn read_builder_result(
    output_path: &Path,
    schema_store: &SchemaStore,
    builder_result_schema_path: &Path,
) -> Result<Option<BuilderResult>, BuilderError> {
    if !output_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(output_path).map_err(|source| BuilderError::OutputUnreadable {
        path: output_path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    if schema_store.validate(builder_result_schema_path, &value).is_err() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Run the external-driver dispatch end to end: write the task, spawn the
/// driver, then read back whatever it left at `output_file`. A missing or
/// unparseable output file is a soft failure (`result: None`), same as the
/// interactive-agent modes; only a process-level timeout is a hard error.
pub async fn dispatch_external<P: ExternalDriverProcess>(
    process: &P,
    schema_store: &SchemaStore,
    builder_result_schema_path: &Path,
    task: &Task,
    cfg: &ExternalDispatchConfig,
    cancel: &CancelToken,
) -> Result<BuilderOutcome, BuilderError> {
    let task_path = task_file_path(&cfg.workspace_root);
    let task_json = serde_json::to_vec_pretty(task).expect("Task serializes");
    std::fs::write(&task_path, task_json).map_err(|source| BuilderError::TaskFileUnwritable {
        path: task_path.clone(),
        source,
    })?;

    process.invoke(cfg, cancel).await?;

    let output_path = cfg.workspace_root.join(&cfg.output_file);
    let result = read_builder_result(&output_path, schema_store, builder_result_schema_path)?;
    Ok(BuilderOutcome::Ran { result })
}

#[cfg(test)]
#[path = "external_tests.rs"]
mod tests;
