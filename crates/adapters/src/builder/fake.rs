// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted builder processes for tests: one fake per process-backed mode
//! (patch mode has no process to fake, since it only ever calls `git`
//! through [`super::patch::apply_patch`]).

use super::external::{ExternalDispatchConfig, ExternalDriverProcess};
use super::interactive::{InteractiveBuilderProcess, InteractiveDispatchConfig};
use super::{BuilderError, RawBuilderOutput};
use async_trait::async_trait;
use std::sync::Mutex;
use tick_argv::CancelToken;

/// A scripted [`InteractiveBuilderProcess`]: returns one scripted result per
/// call, oldest first, and records every prompt it was given.
pub struct FakeInteractiveBuilder {
    responses: Mutex<Vec<Result<RawBuilderOutput, BuilderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeInteractiveBuilder {
    pub fn new(responses: Vec<Result<RawBuilderOutput, BuilderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts_seen().len()
    }
}

#[async_trait]
impl InteractiveBuilderProcess for FakeInteractiveBuilder {
    async fn invoke(
        &self,
        prompt: &str,
        _cfg: &InteractiveDispatchConfig,
        _cancel: &CancelToken,
    ) -> Result<RawBuilderOutput, BuilderError> {
        self.prompts.lock().expect("prompts lock poisoned").push(prompt.to_string());
        let mut responses = self.responses.lock().expect("responses lock poisoned");
        if responses.is_empty() {
            panic!("FakeInteractiveBuilder invoked more times than scripted responses");
        }
        responses.remove(0)
    }
}

/// A scripted [`ExternalDriverProcess`]. Since the real driver communicates
/// its result through a file rather than stdout, tests that want a
/// `BuilderResult` to come back should have the scripted closure write the
/// output file itself before returning.
pub struct FakeExternalDriver {
    responses: Mutex<Vec<Result<RawBuilderOutput, BuilderError>>>,
    invocations: Mutex<u32>,
}

impl FakeExternalDriver {
    pub fn new(responses: Vec<Result<RawBuilderOutput, BuilderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            invocations: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.invocations.lock().expect("invocations lock poisoned")
    }
}

#[async_trait]
impl ExternalDriverProcess for FakeExternalDriver {
    async fn invoke(&self, _cfg: &ExternalDispatchConfig, _cancel: &CancelToken) -> Result<RawBuilderOutput, BuilderError> {
        *self.invocations.lock().expect("invocations lock poisoned") += 1;
        let mut responses = self.responses.lock().expect("responses lock poisoned");
        if responses.is_empty() {
            panic!("FakeExternalDriver invoked more times than scripted responses");
        }
        responses.remove(0)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
