// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs an [`Argv`] as a child process with a timeout and a cooperative
//! cancellation token (§5 "timeouts", "cancellation"). Every subprocess in
//! the workspace — git, the planner CLI, the builder CLI, a verification
//! command — goes through [`run`].

use crate::cancel::CancelToken;
use crate::model::Argv;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// The three ways a supervised subprocess can end (§9 "subprocess result vs.
/// truth": a nonzero exit or an [`Outcome::TimedOut`]/[`Outcome::Cancelled`]
/// is never interpreted as success by a caller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(Completed),
    TimedOut { elapsed: Duration },
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn or run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Spawn `argv`, race it against `timeout` and `cancel`, and classify the
/// result.
///
/// The underlying `Command` is marked `kill_on_drop`, so whichever branch of
/// the race loses — timeout elapsed, or cancellation requested — the
/// in-flight child is killed the moment its future is dropped; there is no
/// separate terminate-then-kill step to orchestrate here because tokio's
/// own `kill_on_drop` already collapses "stop waiting" and "kill the child"
/// into the same moment (the ≈1s grace period from §5 belongs to the
/// caller's own escalation policy when it additionally needs to distinguish
/// "asked nicely" from "killed", as the interactive builder dispatcher
/// does).
pub async fn run(argv: &Argv, timeout: Duration, cancel: &CancelToken) -> Result<Outcome, ExecError> {
    let program = argv.program().to_string();
    let mut command = argv.to_tokio_command();
    command.stdin(std::process::Stdio::null());
    command.kill_on_drop(true);
    let start = std::time::Instant::now();

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            warn!(program = %program, "cancellation requested, killing subprocess");
            Ok(Outcome::Cancelled)
        }

        result = tokio::time::timeout(timeout, command.output()) => {
            match result {
                Ok(Ok(output)) => {
                    debug!(
                        program = %program,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "subprocess completed"
                    );
                    Ok(Outcome::Completed(Completed {
                        exit_code: output.status.code(),
                        stdout: output.stdout,
                        stderr: output.stderr,
                        duration: start.elapsed(),
                    }))
                }
                Ok(Err(source)) => Err(ExecError::Io { program, source }),
                Err(_elapsed) => {
                    warn!(program = %program, timeout_secs = timeout.as_secs(), "subprocess timed out");
                    Ok(Outcome::TimedOut { elapsed: start.elapsed() })
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
