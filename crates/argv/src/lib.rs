// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tick-argv: the argv-only subprocess model (§9 "argv purity", P7).
//!
//! Every external process this workspace spawns is built as an [`Argv`] —
//! a `(program, args, env, cwd)` tuple — and run through [`exec::run`],
//! which races the child against a timeout and a [`cancel::CancelToken`].
//! Parameter taint validation and `{{param}}` substitution for the
//! verification executor (C9) live here too, since they're a property of
//! argv discipline broadly, not of any one caller.

pub mod cancel;
pub mod exec;
pub mod model;
pub mod taint;

pub use cancel::CancelToken;
pub use exec::{run, Completed, ExecError, Outcome};
pub use model::Argv;
pub use taint::{substitute_params, TaintError, TaintPolicy};
