// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The argv-only command model (§9, "argv purity"): every external process
//! this workspace spawns — git, the planner CLI, the builder CLI, a
//! verification binary — is represented as a `(program, args, env, cwd)`
//! tuple with no constructor that accepts a shell string. There is no
//! `Argv::from_shell_str` and there never should be (P7).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One external process invocation, taken verbatim by the executor.
///
/// `args` is never interpolated through a shell; every element is passed to
/// the OS as a distinct argv entry. Build one with [`Argv::new`] and the
/// builder methods below — there is deliberately no way to construct one
/// from a single command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: PathBuf,
}

impl Argv {
    /// Start building an invocation of `program` with cwd fixed to `cwd`.
    /// Arguments are added with [`Argv::arg`]/[`Argv::args`].
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn envs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a `tokio::process::Command` from this invocation. This is the
    /// only place in the workspace that should ever construct a `Command`
    /// directly — every caller goes through `Argv` first.
    pub fn to_tokio_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd.current_dir(&self.cwd);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
