// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The prompt builder (C6, §4.6): interpolates the orchestrator's prompt
//! template with the active milestone, a budget summary, the available
//! verification template ids, a size-bounded worktree status snippet, and
//! size-bounded project documents. Each section has a fixed character cap
//! (§9 "cyclic/self-referential planner state": project documents the
//! planner itself wrote on a prior tick must not be fed back unbounded) —
//! a section over its cap is truncated with a visible marker rather than
//! silently dropped.

use tick_core::config::PerMilestoneBudgets;
use tick_core::{MilestoneId, WorkspaceState};
use tick_vcs::PorcelainEntry;

/// Cap on the rendered worktree-status section, in characters.
pub const MAX_WORKTREE_STATUS_CHARS: usize = 4_000;
/// Cap on each project-document section (facts/plan/roadmap), in characters.
pub const MAX_DOC_CHARS: usize = 8_000;
/// Cap on the last report's summary, in characters.
pub const MAX_LAST_REPORT_CHARS: usize = 4_000;

const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Everything the prompt template can reference, gathered by the caller
/// before a planner dispatch.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub milestone_id: Option<&'a MilestoneId>,
    pub state: &'a WorkspaceState,
    pub caps: &'a PerMilestoneBudgets,
    pub verification_template_ids: &'a [String],
    pub worktree_status: &'a [PorcelainEntry],
    pub facts: Option<&'a str>,
    pub plan: Option<&'a str>,
    pub roadmap: Option<&'a str>,
    pub last_report_summary: Option<&'a str>,
    pub retry_reason: Option<&'a str>,
}

/// Truncate `text` to at most `cap` characters, appending a visible marker
/// when truncation happened.
fn truncate(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let mut out: String = text.chars().take(cap).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

fn budget_summary(state: &WorkspaceState, caps: &PerMilestoneBudgets) -> String {
    let b = &state.budgets;
    format!(
        "ticks: {}/{}\norchestrator_calls: {}/{}\nbuilder_calls: {}/{}\nverify_runs: {}/{}\nestimated_cost_usd: {:.2}/{:.2}",
        b.ticks,
        caps.max_ticks,
        b.orchestrator_calls,
        caps.max_orchestrator_calls,
        b.builder_calls,
        caps.max_builder_calls,
        b.verify_runs,
        caps.max_verify_runs,
        b.estimated_cost_usd,
        caps.max_estimated_cost_usd,
    )
}

fn worktree_status_snippet(entries: &[PorcelainEntry]) -> String {
    if entries.is_empty() {
        return "(clean)".to_string();
    }
    let joined = entries
        .iter()
        .map(|e| format!("{}{} {}", e.index_status, e.worktree_status, e.path))
        .collect::<Vec<_>>()
        .join("\n");
    truncate(&joined, MAX_WORKTREE_STATUS_CHARS)
}

fn doc_section(label: &str, doc: Option<&str>) -> String {
    match doc {
        Some(text) if !text.is_empty() => format!("## {label}\n{}", truncate(text, MAX_DOC_CHARS)),
        _ => format!("## {label}\n(none)"),
    }
}

/// Build the single prompt string sent to the planner for this tick, by
/// interpolating `template` (the contents of `orchestrator.user_prompt_file`)
/// with every section in `ctx`.
///
/// Recognized placeholders: `{{milestone}}`, `{{budget_summary}}`,
/// `{{verification_templates}}`, `{{worktree_status}}`, `{{facts}}`,
/// `{{plan}}`, `{{roadmap}}`, `{{last_report}}`, `{{retry_reason}}`.
/// A placeholder absent from `template` is simply never substituted —
/// templates are free to reference only the sections they need.
pub fn build(template: &str, ctx: &PromptContext) -> String {
    let milestone = ctx
        .milestone_id
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "(none assigned yet)".to_string());
    let verification_templates = if ctx.verification_template_ids.is_empty() {
        "(none configured)".to_string()
    } else {
        ctx.verification_template_ids.join(", ")
    };
    let last_report = match ctx.last_report_summary {
        Some(text) if !text.is_empty() => truncate(text, MAX_LAST_REPORT_CHARS),
        _ => "(no prior report)".to_string(),
    };
    let retry_reason = ctx.retry_reason.unwrap_or("(none)");

    template
        .replace("{{milestone}}", &milestone)
        .replace("{{budget_summary}}", &budget_summary(ctx.state, ctx.caps))
        .replace("{{verification_templates}}", &verification_templates)
        .replace("{{worktree_status}}", &worktree_status_snippet(ctx.worktree_status))
        .replace("{{facts}}", &doc_section("Facts", ctx.facts))
        .replace("{{plan}}", &doc_section("Plan", ctx.plan))
        .replace("{{roadmap}}", &doc_section("Roadmap", ctx.roadmap))
        .replace("{{last_report}}", &last_report)
        .replace("{{retry_reason}}", retry_reason)
}

/// Build the prompt sent to a builder process (§4.7): the builder's own
/// system prompt, followed by its user-prompt template with `{{instructions}}`
/// substituted for the task's `builder.instructions` text. A template that
/// doesn't reference `{{instructions}}` still gets the instructions appended,
/// so a task's intent is never silently dropped.
pub fn build_builder_prompt(system_prompt: &str, user_template: &str, instructions: &str) -> String {
    let (user, substituted) = if user_template.contains("{{instructions}}") {
        (user_template.replace("{{instructions}}", instructions), true)
    } else {
        (user_template.to_string(), false)
    };
    if substituted {
        format!("{system_prompt}\n\n{user}")
    } else {
        format!("{system_prompt}\n\n{user}\n\n{instructions}")
    }
}

/// Read an optional project document from disk, treating a missing file as
/// absent rather than an error (§7, "missing optional files treated as
/// empty").
pub fn read_optional_doc(path: &std::path::Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
