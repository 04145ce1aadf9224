// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging bootstrap (A2, §4.14): `tracing-subscriber` with an env-filter
//! layer and a non-blocking file layer writing `<workspace>/tick.log`,
//! falling back to `logging.level` from config when `RUST_LOG` is unset.

use std::path::Path;
use tick_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keeps the non-blocking writer's background flush thread alive; drop
/// this only on process exit so no log lines are lost mid-write.
pub struct LoggingGuard(#[allow(dead_code)] tracing_appender::non_blocking::WorkerGuard);

/// Initialize the global `tracing` subscriber for one `tick run` invocation.
///
/// `RUST_LOG` always wins over `logging.level` when set, matching the
/// rest of the workspace's convention of env-filter-first configuration.
pub fn init(workspace_dir: &Path, logging: &LoggingConfig) -> std::io::Result<LoggingGuard> {
    std::fs::create_dir_all(workspace_dir)?;
    let log_file_name = logging.file.clone().unwrap_or_else(|| "tick.log".to_string());
    let file_appender = tracing_appender::rolling::never(workspace_dir, &log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|error| std::io::Error::other(error.to_string()))?;

    Ok(LoggingGuard(guard))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
