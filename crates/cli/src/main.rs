// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tick - the CLI entry point (A3, §4.15) for the local, deterministic LLM
//! coding-agent tick runner. `tick run` drives exactly one tick through
//! [`tick_engine::TickEngine`] and exits with a verdict-derived status
//! code; every other subcommand is out of scope (§1) and stubbed for
//! discoverability only.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tick_adapters::{
    ProcessExternalDriver, ProcessInteractiveBuilder, ProcessPlanner, TracedExternalDriver, TracedInteractiveBuilder, TracedPlanner,
};
use tick_argv::CancelToken;
use tick_core::{Report, SystemClock, Verdict};
use tick_engine::{load_config, TickDeps, TickEngine};
use tick_schema::SchemaStore;
use tick_storage::WorkspacePaths;
use tick_vcs::GitAdapter;

#[derive(Parser)]
#[command(name = "tick", version, about = "Drives one tick of the local orchestration runner")]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run exactly one tick: preflight, planner, builder, judge, verify, report (§4.12)
    Run(RunArgs),
    /// Not implemented in the core tick engine — see the outer loop tool
    Init,
    /// Not implemented in the core tick engine — see the outer loop tool
    Status,
    /// Not implemented in the core tick engine — see the outer loop tool
    Doctor,
    /// Not implemented in the core tick engine — see the outer loop tool
    Loop,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the runner config file
    #[arg(long, default_value = "tick.config.json")]
    config: PathBuf,

    /// Path to the JSON Schema used to validate the config file. Defaults
    /// to `config.schema.json` alongside `--config`.
    #[arg(long)]
    config_schema: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir).with_context(|| format!("changing directory to {}", dir.display()))?;
    }

    match cli.command {
        Commands::Run(args) => run_tick(args).await,
        Commands::Init | Commands::Status | Commands::Doctor | Commands::Loop => {
            println!("not implemented in the core tick engine");
            Ok(2)
        }
    }
}

async fn run_tick(args: RunArgs) -> Result<i32> {
    let repo_root = std::env::current_dir().context("resolving repo root")?;
    let config_schema_path = args.config_schema.clone().unwrap_or_else(|| default_config_schema_path(&args.config));

    let schema_store = SchemaStore::new();
    let config =
        load_config(&args.config, &schema_store, &config_schema_path).with_context(|| format!("loading {}", args.config.display()))?;

    let paths = WorkspacePaths::new(repo_root.join(&config.workspace_dir));
    let workspace_dir = paths.workspace_dir().to_path_buf();
    let _log_guard = logging::init(&workspace_dir, &config.logging).context("initializing logging")?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received interrupt, cancelling the active tick");
                cancel.cancel();
            }
        });
    }

    let deps = TickDeps {
        planner: TracedPlanner::new(ProcessPlanner),
        interactive_builder: TracedInteractiveBuilder::new(ProcessInteractiveBuilder),
        external_driver: TracedExternalDriver::new(ProcessExternalDriver),
        clock: SystemClock,
        git: GitAdapter::new(repo_root.clone()),
        schema_store,
        paths,
        config_path: args.config.clone(),
        config_schema_path,
        cancel,
    };

    let engine = TickEngine::new(deps);
    let report = engine.run_tick().await;

    print_summary(&report, &workspace_dir);

    Ok(match report.verdict {
        Verdict::Success => 0,
        Verdict::Stop => 1,
        Verdict::Blocked => 2,
    })
}

fn default_config_schema_path(config_path: &Path) -> PathBuf {
    config_path.parent().unwrap_or_else(|| Path::new(".")).join("config.schema.json")
}

/// The fixed-format stdout summary (§7): a short human-readable line plus
/// pointers to the canonical artifacts. Never the sole record of the
/// tick — `REPORT.json`/`REPORT.md` under the workspace are authoritative.
fn print_summary(report: &Report, workspace_dir: &Path) {
    println!("tick {} — {:?} ({})", report.run_id, report.verdict, report.code);
    println!("{}", report.task_summary);
    println!(
        "files touched: {} | lines +{}/-{}",
        report.blast_radius.files_touched, report.blast_radius.lines_added, report.blast_radius.lines_deleted
    );
    for run in &report.verification.runs {
        println!("verify[{:?}] {} -> {:?}", run.phase, run.template_id, run.status);
    }
    println!("report: {}", workspace_dir.join("REPORT.json").display());
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
