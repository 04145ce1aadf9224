// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scripted [`PlannerProcess`] for tests: returns a fixed sequence of raw
//! outputs, one per call, and records every prompt it was given.

use super::{PlannerDispatchConfig, PlannerError, PlannerProcess, RawPlannerOutput};
use async_trait::async_trait;
use std::sync::Mutex;
use tick_argv::CancelToken;

pub struct FakePlanner {
    responses: Mutex<Vec<RawPlannerOutput>>,
    prompts: Mutex<Vec<String>>,
}

impl FakePlanner {
    /// Responses are consumed in order, oldest first; a call past the end
    /// of the list panics, since that means the dispatcher invoked the
    /// planner more times than the test scripted (a P8 violation).
    pub fn new(responses: Vec<RawPlannerOutput>) -> Self {
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
impl PlannerProcess for FakePlanner {
    async fn invoke(
        &self,
        prompt: &str,
        _cfg: &PlannerDispatchConfig,
        _cancel: &CancelToken,
    ) -> Result<RawPlannerOutput, PlannerError> {
        self.prompts
            .lock()
            .expect("prompts lock poisoned")
            .push(prompt.to_string());
        let mut responses = self.responses.lock().expect("responses lock poisoned");
        if responses.is_empty() {
            panic!("FakePlanner invoked more times than scripted responses");
        }
        Ok(responses.remove(0))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
