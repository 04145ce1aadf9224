// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive-agent builder mode (§4.7): invoke the builder process with
//! tool restrictions, enforce a timeout, parse its response against the
//! builder-result schema.
//!
//! Strict vs. lenient only changes what an unparseable response means:
//! strict treats it as "no advisory result available" (`result: None`),
//! lenient synthesizes a `BuilderResult` with `builder_output_valid =
//! Some(false)`. Neither mode turns a parse failure into a tick-ending
//! error — the judge never trusts this value either way, so there is
//! nothing for a parse failure to invalidate except the advisory summary
//! itself.

use super::{BuilderError, BuilderOutcome, RawBuilderOutput};
use crate::json_extract::{extract_json_object, extract_result_field};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tick_argv::{Argv, CancelToken, Outcome};
use tick_core::BuilderResult;
use tick_schema::SchemaStore;

#[derive(Debug, Clone)]
pub struct InteractiveDispatchConfig {
    pub command: Vec<String>,
    pub model: String,
    pub permission_mode: String,
    pub allowed_tools: Vec<String>,
    pub max_turns: u32,
    pub timeout: Duration,
    pub strict_builder_json: bool,
    pub cwd: PathBuf,
}

#[async_trait]
pub trait InteractiveBuilderProcess: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &InteractiveDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawBuilderOutput, BuilderError>;
}

pub struct ProcessInteractiveBuilder;

#[async_trait]
impl InteractiveBuilderProcess for ProcessInteractiveBuilder {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &InteractiveDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawBuilderOutput, BuilderError> {
        let (program, rest) = cfg
            .command
            .split_first()
            .expect("builder_cli.command is non-empty (schema-enforced)");
        let mut argv = Argv::new(program.clone(), cfg.cwd.clone())
            .args(rest.iter().cloned())
            .arg("--model")
            .arg(cfg.model.clone())
            .arg("--permission-mode")
            .arg(cfg.permission_mode.clone())
            .arg("--max-turns")
            .arg(cfg.max_turns.to_string());
        for tool in &cfg.allowed_tools {
            argv = argv.arg("--allowed-tool").arg(tool.clone());
        }
        argv = argv.arg(prompt.to_string());

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

/// Clamp a task-requested `max_turns` to the configured ceiling (§4.7).
pub fn clamp_max_turns(requested: u32, ceiling: u32) -> u32 {
    requested.min(ceiling)
}

fn try_parse_builder_result(
    raw: &RawBuilderOutput,
    schema_store: &SchemaStore,
    schema_path: &std::path::Path,
) -> Option<BuilderResult> {
    let model_text = extract_result_field(&raw.stdout);
    let value = extract_json_object(&model_text)?;
    schema_store.validate(schema_path, &value).ok()?;
    serde_json::from_value(value).ok()
}

pub async fn dispatch_interactive<P: InteractiveBuilderProcess>(
    process: &P,
    schema_store: &SchemaStore,
    builder_result_schema_path: &std::path::Path,
    prompt: &str,
    cfg: &InteractiveDispatchConfig,
    cancel: &CancelToken,
) -> Result<BuilderOutcome, BuilderError> {
    let raw = process.invoke(prompt, cfg, cancel).await?;

    let parsed = try_parse_builder_result(&raw, schema_store, builder_result_schema_path);
    let result = match parsed {
        Some(result) => Some(result),
        None if cfg.strict_builder_json => None,
        None => Some(BuilderResult {
            builder_output_valid: Some(false),
            ..Default::default()
        }),
    };

    Ok(BuilderOutcome::Ran { result })
}

#[cfg(test)]
#[path = "interactive_tests.rs"]
mod tests;
