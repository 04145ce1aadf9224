// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability across the planner
//! and builder dispatchers.

use crate::builder::external::{ExternalDispatchConfig, ExternalDriverProcess};
use crate::builder::interactive::{InteractiveBuilderProcess, InteractiveDispatchConfig};
use crate::builder::{BuilderError, RawBuilderOutput};
use crate::planner::{PlannerDispatchConfig, PlannerError, PlannerProcess, RawPlannerOutput};
use async_trait::async_trait;
use tick_argv::CancelToken;
use tracing::Instrument;

/// Wrapper that adds tracing to any [`PlannerProcess`].
#[derive(Clone)]
pub struct TracedPlanner<P> {
    inner: P,
}

impl<P> TracedPlanner<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: PlannerProcess> PlannerProcess for TracedPlanner<P> {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &PlannerDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawPlannerOutput, PlannerError> {
        let span = tracing::info_span!("planner.invoke", model = %cfg.model, max_turns = cfg.max_turns);
        async {
            tracing::info!(prompt_len = prompt.len(), "invoking planner");
            let start = std::time::Instant::now();
            let result = self.inner.invoke(prompt, cfg, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(raw) => tracing::info!(elapsed_ms, exit_code = ?raw.exit_code, "planner returned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "planner invocation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any [`InteractiveBuilderProcess`].
#[derive(Clone)]
pub struct TracedInteractiveBuilder<B> {
    inner: B,
}

impl<B> TracedInteractiveBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: InteractiveBuilderProcess> InteractiveBuilderProcess for TracedInteractiveBuilder<B> {
    async fn invoke(
        &self,
        prompt: &str,
        cfg: &InteractiveDispatchConfig,
        cancel: &CancelToken,
    ) -> Result<RawBuilderOutput, BuilderError> {
        let span = tracing::info_span!("builder.interactive.invoke", model = %cfg.model, max_turns = cfg.max_turns);
        async {
            tracing::info!(prompt_len = prompt.len(), "invoking interactive builder");
            let start = std::time::Instant::now();
            let result = self.inner.invoke(prompt, cfg, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(raw) => tracing::info!(elapsed_ms, exit_code = ?raw.exit_code, "builder returned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "builder invocation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any [`ExternalDriverProcess`].
#[derive(Clone)]
pub struct TracedExternalDriver<D> {
    inner: D,
}

impl<D> TracedExternalDriver<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: ExternalDriverProcess> ExternalDriverProcess for TracedExternalDriver<D> {
    async fn invoke(&self, cfg: &ExternalDispatchConfig, cancel: &CancelToken) -> Result<RawBuilderOutput, BuilderError> {
        let span = tracing::info_span!("builder.external.invoke", output_file = %cfg.output_file);
        async {
            tracing::info!("spawning external driver");
            let start = std::time::Instant::now();
            let result = self.inner.invoke(cfg, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(raw) => tracing::info!(elapsed_ms, exit_code = ?raw.exit_code, "driver returned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "driver invocation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
