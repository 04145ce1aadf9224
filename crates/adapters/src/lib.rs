// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Dispatchers that turn a planner CLI and a builder CLI into the
//! [`tick_core::Task`] / [`tick_core::BuilderResult`] shapes the engine
//! acts on.

pub mod builder;
mod json_extract;
pub mod planner;
pub mod traced;

pub use builder::external::{dispatch_external, ExternalDispatchConfig, ExternalDriverProcess, ProcessExternalDriver, TASK_FILE_NAME};
pub use builder::interactive::{clamp_max_turns, dispatch_interactive, InteractiveBuilderProcess, InteractiveDispatchConfig, ProcessInteractiveBuilder};
pub use builder::patch::{apply_patch, dispatch_patch, extract_patch_paths, validate_patch_paths, PatchPath};
pub use builder::{BuilderError, BuilderOutcome, RawBuilderOutput};
pub use planner::{
    dispatch_planner, PlannerAttemptFailure, PlannerDispatchConfig, PlannerDispatchError, PlannerError, PlannerProcess, ProcessPlanner,
    RawPlannerOutput,
};
pub use traced::{TracedExternalDriver, TracedInteractiveBuilder, TracedPlanner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use builder::fake::{FakeExternalDriver, FakeInteractiveBuilder};
#[cfg(any(test, feature = "test-support"))]
pub use planner::fake::FakePlanner;
