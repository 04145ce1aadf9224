//! Behavioral specifications for the `tick` CLI.
//!
//! Black-box: every test spawns the compiled binary and asserts on its
//! exit code, stdout, and the files it leaves on disk. Scenarios that
//! would require a real planner/builder LLM CLI are left to the engine's
//! own unit-level fakes (see `crates/engine/src/tick_tests.rs`); this
//! suite covers only what is reachable without one.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli.rs"]
mod cli;
#[path = "specs/preflight.rs"]
mod preflight;
