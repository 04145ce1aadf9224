// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The report writer (C11, §4.11): assembles the canonical [`Report`],
//! renders its deterministic Markdown projection, and writes both through
//! the atomic store — the one artifact every tick unconditionally emits,
//! written exactly once per tick regardless of which phase ended it.
//!
//! On a `BLOCKED` verdict, the same report is additionally written to
//! `BLOCKED.json` as an operator signal; a later `SUCCESS` tick clears it.
//! When history is enabled, a snapshot (`report.json`, `report.md`, and,
//! if configured, `diff.patch`/`verify.log`) is kept under
//! `history/<run_id>/` for later inspection.

use thiserror::Error;
use tick_core::config::HistoryConfig;
use tick_core::{Report, Verdict};
use tick_storage::{HistoryError, HistoryStore, StoreError, WorkspacePaths};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report store error: {0}")]
    Store(#[from] StoreError),
    #[error("report history error: {0}")]
    History(#[from] HistoryError),
}

/// Debug artifacts collected during the tick that accompany the report in
/// the history snapshot, but never live under the workspace root itself.
#[derive(Debug, Clone, Default)]
pub struct ReportArtifacts<'a> {
    pub diff_patch: Option<&'a str>,
    pub verify_log: Option<&'a str>,
}

/// Render the deterministic Markdown projection of `report` (§6, `REPORT.md`
/// is "a deterministic projection of `REPORT.json`" — never an independent
/// source of truth, and never hand-edited).
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Tick Report: {}\n\n", report.run_id));
    out.push_str(&format!("**Verdict:** {}\n", verdict_str(report.verdict)));
    out.push_str(&format!("**Code:** {}\n", report.code));
    out.push_str(&format!("**Started:** {}\n", report.started_at.to_rfc3339()));
    out.push_str(&format!("**Ended:** {}\n", report.ended_at.to_rfc3339()));
    out.push_str(&format!("**Duration:** {}ms\n", report.duration_ms));
    out.push_str(&format!("**Base commit:** {}\n", report.base_commit));
    if let Some(head) = &report.head_commit {
        out.push_str(&format!("**Head commit:** {head}\n"));
    }
    out.push('\n');

    out.push_str("## Task\n");
    out.push_str(&report.task_summary);
    out.push_str("\n\n");

    out.push_str("## Scope\n");
    out.push_str(&format!("ok: {}\n", report.scope.ok));
    if !report.scope.violations.is_empty() {
        out.push_str("violations:\n");
        for v in &report.scope.violations {
            out.push_str(&format!("- {v}\n"));
        }
    }
    if !report.scope.touched_paths.is_empty() {
        out.push_str("touched paths:\n");
        for p in &report.scope.touched_paths {
            out.push_str(&format!("- {p}\n"));
        }
    }
    out.push('\n');

    out.push_str("## Diff\n");
    out.push_str(&format!(
        "files_changed={} lines_changed={}\n",
        report.diff.files_changed, report.diff.lines_changed
    ));
    out.push_str(&format!(
        "blast_radius: files_touched={} lines_added={} lines_deleted={} new_files={}\n",
        report.blast_radius.files_touched,
        report.blast_radius.lines_added,
        report.blast_radius.lines_deleted,
        report.blast_radius.new_files
    ));
    if let Some(patch_path) = &report.diff.patch_path {
        out.push_str(&format!("patch: {patch_path}\n"));
    }
    out.push('\n');

    out.push_str("## Verification\n");
    out.push_str(&format!("exec_mode: {}\n", report.verification.exec_mode));
    for run in &report.verification.runs {
        out.push_str(&format!(
            "- {} ({:?}) {:?} exit={:?} duration_ms={}\n",
            run.template_id, run.phase, run.status, run.exit_code, run.duration_ms
        ));
    }
    if let Some(log_path) = &report.verification.log_path {
        out.push_str(&format!("log: {log_path}\n"));
    }
    out.push('\n');

    out.push_str("## Budgets\n");
    if let Some(milestone) = &report.budgets.milestone_id {
        out.push_str(&format!("milestone: {milestone}\n"));
    }
    out.push_str(&format!(
        "ticks={} orchestrator_calls={} builder_calls={} verify_runs={} estimated_cost_usd={:.2}\n",
        report.budgets.ticks,
        report.budgets.orchestrator_calls,
        report.budgets.builder_calls,
        report.budgets.verify_runs,
        report.budgets.estimated_cost_usd
    ));
    for warning in &report.budgets.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out.push('\n');

    if let Some(pointers) = &report.pointers {
        out.push_str("## Pointers\n");
        if let Some(dir) = &pointers.planner_debug_dir {
            out.push_str(&format!("planner_debug_dir: {dir}\n"));
        }
        if let Some(dir) = &pointers.builder_debug_dir {
            out.push_str(&format!("builder_debug_dir: {dir}\n"));
        }
        out.push('\n');
    }

    out
}

fn verdict_str(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Success => "SUCCESS",
        Verdict::Stop => "STOP",
        Verdict::Blocked => "BLOCKED",
    }
}

/// Write `report` and its Markdown projection through the atomic store,
/// maintain `BLOCKED.json` as an operator signal, and snapshot into history
/// when enabled (§4.11, §6).
pub fn write_report(
    paths: &WorkspacePaths,
    history: &HistoryStore,
    history_config: &HistoryConfig,
    report: &Report,
    artifacts: ReportArtifacts<'_>,
) -> Result<(), ReportError> {
    let markdown = render_markdown(report);

    tick_storage::write_json_atomic(&paths.report_json(), report)?;
    tick_storage::write_text_atomic(&paths.report_md(), &markdown)?;

    match report.verdict {
        Verdict::Blocked => tick_storage::write_json_atomic(&paths.blocked_json(), report)?,
        _ => {
            let blocked_path = paths.blocked_json();
            if blocked_path.exists() {
                let _ = std::fs::remove_file(&blocked_path);
            }
        }
    }

    if history_config.enabled {
        let run_id = report.run_id.as_str();
        let report_json = serde_json::to_vec_pretty(report).expect("Report serializes");
        history.write_artifact(run_id, "report.json", &report_json)?;
        history.write_artifact(run_id, "report.md", markdown.as_bytes())?;

        let meta = serde_json::json!({
            "run_id": run_id,
            "verdict": verdict_str(report.verdict),
            "code": report.code.to_string(),
            "started_at": report.started_at.to_rfc3339(),
            "ended_at": report.ended_at.to_rfc3339(),
            "duration_ms": report.duration_ms,
            "base_commit": report.base_commit,
            "head_commit": report.head_commit,
        });
        let meta_json = serde_json::to_vec_pretty(&meta).expect("meta serializes");
        history.write_artifact(run_id, "meta.json", &meta_json)?;
        if history_config.include_diff_patch {
            if let Some(patch) = artifacts.diff_patch {
                history.write_artifact(run_id, "diff.patch", patch.as_bytes())?;
            }
        }
        if history_config.include_verify_log {
            if let Some(log) = artifacts.verify_log {
                history.write_artifact(run_id, "verify.log", log.as_bytes())?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "report_writer_tests.rs"]
mod tests;
