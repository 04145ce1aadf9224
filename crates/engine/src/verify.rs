// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The verification executor (C9, §4.9): taint-validate a task's whole
//! verification batch up front, then run fast templates before slow ones,
//! stopping at the first failure. Classification reads only subprocess
//! exit codes — never the builder's own say-so (§9).

use regex::Regex;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tick_argv::{run as argv_run, substitute_params, Argv, CancelToken, Outcome, TaintError, TaintPolicy};
use tick_core::{Code, Config, Task, VerificationPhase, VerificationRunRecord, VerificationStatus};

/// Everything a clean verification pass hands to the report writer.
#[derive(Debug, Clone, Default)]
pub struct VerifyOutcome {
    pub runs: Vec<VerificationRunRecord>,
}

/// One of §4.9's stop conditions.
#[derive(Debug, Error, Clone)]
pub enum VerifyStop {
    #[error("verification parameter tainted: {0}")]
    Tainted(#[from] TaintError),
    #[error("task references unknown verification template `{template_id}`")]
    UnknownTemplate { template_id: String },
    #[error("`reject_metachars_regex` does not compile: {0}")]
    InvalidMetacharRegex(String),
    #[error("verification template `{template_id}` ({phase:?}) timed out")]
    FlakyOrTimeout { template_id: String, phase: VerificationPhase },
    #[error("fast verification `{template_id}` failed: exit={exit_code:?}")]
    FailedFast { template_id: String, exit_code: Option<i32> },
    #[error("slow verification `{template_id}` failed: exit={exit_code:?}")]
    FailedSlow { template_id: String, exit_code: Option<i32> },
}

impl VerifyStop {
    pub fn code(&self) -> Code {
        match self {
            VerifyStop::Tainted(_) | VerifyStop::UnknownTemplate { .. } | VerifyStop::InvalidMetacharRegex(_) => {
                Code::StopVerifyTainted
            }
            VerifyStop::FlakyOrTimeout { .. } => Code::StopVerifyFlakyOrTimeout,
            VerifyStop::FailedFast { .. } => Code::StopVerifyFailedFast,
            VerifyStop::FailedSlow { .. } => Code::StopVerifyFailedSlow,
        }
    }
}

/// Either a judge-style stop, or cancellation observed mid-batch — kept
/// distinct from [`VerifyStop`] the same way [`crate::judge::JudgeError`]
/// separates a ruled outcome from a transport failure (§5 "cancellation as
/// message-passing").
#[derive(Debug, Error, Clone)]
pub enum VerifyError {
    #[error(transparent)]
    Stop(#[from] VerifyStop),
    #[error("verification cancelled")]
    Cancelled,
}

impl VerifyError {
    pub fn code(&self) -> Code {
        match self {
            VerifyError::Stop(inner) => inner.code(),
            VerifyError::Cancelled => Code::StopInterrupted,
        }
    }
}

struct PlannedRun<'a> {
    template_id: &'a str,
    phase: VerificationPhase,
    argv: Argv,
}

/// One parameter name, type-tagged as path-shaped or not by a naming
/// convention (`*path*`), since neither the template nor the task schema
/// carries an explicit per-parameter type (an Open Question left to this
/// implementation — see DESIGN.md).
fn is_path_param(name: &str) -> bool {
    name.to_ascii_lowercase().contains("path")
}

fn merged_params<'a>(
    task: &'a Task,
    template_id: &str,
    default_params: &'a std::collections::HashMap<String, String>,
) -> std::collections::HashMap<String, String> {
    let mut merged = default_params.clone();
    if let Some(task_params) = task.verification.params.get(template_id) {
        for (k, v) in task_params {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

/// Run the full verification batch for `task` (§4.9): validate every
/// parameter across every requested template before any command runs, then
/// execute fast templates in order, then slow templates, stopping at the
/// first failure.
pub async fn run(
    task: &Task,
    config: &Config,
    repo_root: &Path,
    cancel: &CancelToken,
) -> Result<VerifyOutcome, VerifyError> {
    let verification = &config.verification;

    if task.verification.fast.is_empty() && task.verification.slow.is_empty() {
        return Ok(VerifyOutcome::default());
    }

    let metachar_regex = Regex::new(&verification.reject_metachars_regex)
        .map_err(|_| VerifyStop::InvalidMetacharRegex(verification.reject_metachars_regex.clone()))?;
    let policy = TaintPolicy {
        max_param_len: verification.max_param_len,
        reject_whitespace: verification.reject_whitespace_in_params,
        reject_dotdot: verification.reject_dotdot,
        metachar_regex,
    };

    let phases: [(VerificationPhase, &[String]); 2] =
        [(VerificationPhase::Fast, &task.verification.fast), (VerificationPhase::Slow, &task.verification.slow)];

    let mut planned: Vec<PlannedRun> = Vec::new();
    for (phase, template_ids) in phases {
        for template_id in template_ids {
            let template = verification
                .templates
                .iter()
                .find(|t| &t.id == template_id)
                .ok_or_else(|| VerifyStop::UnknownTemplate { template_id: template_id.clone() })?;
            let params = merged_params(task, template_id, &template.default_params);

            for (name, value) in &params {
                if is_path_param(name) {
                    policy.validate_path(name, value, repo_root)?;
                } else {
                    policy.validate(name, value)?;
                }
            }

            let (program, rest) = template
                .argv
                .split_first()
                .ok_or_else(|| VerifyStop::UnknownTemplate { template_id: template_id.clone() })?;
            let substituted = substitute_params(rest, &params);
            let argv = Argv::new(program.clone(), repo_root.to_path_buf()).args(substituted);
            planned.push(PlannedRun { template_id, phase, argv });
        }
    }

    let mut runs = Vec::new();
    for planned_run in &planned {
        let timeout = match planned_run.phase {
            VerificationPhase::Fast => Duration::from_secs(verification.timeout_fast_seconds),
            VerificationPhase::Slow => Duration::from_secs(verification.timeout_slow_seconds),
        };
        let started = std::time::Instant::now();
        let outcome = match argv_run(&planned_run.argv, timeout, cancel).await {
            Ok(outcome) => outcome,
            Err(_) => Outcome::Completed(tick_argv::Completed {
                exit_code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                duration: started.elapsed(),
            }),
        };

        let (status, exit_code) = match outcome {
            Outcome::Cancelled => return Err(VerifyError::Cancelled),
            Outcome::TimedOut { .. } => {
                runs.push(VerificationRunRecord {
                    template_id: planned_run.template_id.to_string(),
                    phase: planned_run.phase,
                    status: VerificationStatus::Timeout,
                    exit_code: None,
                    duration_ms: started.elapsed().as_millis() as u64,
                });
                return Err(VerifyError::Stop(VerifyStop::FlakyOrTimeout {
                    template_id: planned_run.template_id.to_string(),
                    phase: planned_run.phase,
                }));
            }
            Outcome::Completed(completed) if completed.success() => (VerificationStatus::Pass, completed.exit_code),
            Outcome::Completed(completed) => (VerificationStatus::Fail, completed.exit_code),
        };

        runs.push(VerificationRunRecord {
            template_id: planned_run.template_id.to_string(),
            phase: planned_run.phase,
            status,
            exit_code,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        if status == VerificationStatus::Fail {
            return Err(VerifyError::Stop(match planned_run.phase {
                VerificationPhase::Fast => VerifyStop::FailedFast { template_id: planned_run.template_id.to_string(), exit_code },
                VerificationPhase::Slow => VerifyStop::FailedSlow { template_id: planned_run.template_id.to_string(), exit_code },
            }));
        }
    }

    Ok(VerifyOutcome { runs })
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
