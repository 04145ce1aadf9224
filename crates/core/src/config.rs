// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration: the single JSON document that parameterizes a
//! tick, validated against `config.schema.json` before it is ever
//! deserialized into these types (§6, "Config keys").

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_output_format() -> String {
    "json".into()
}

fn default_execution_mode() -> String {
    "argv_no_shell".into()
}

fn default_max_parse_retries() -> u32 {
    1
}

/// `runner.crash_cleanup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashCleanup {
    pub delete_tmp_glob: String,
}

/// `runner.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_true")]
    pub require_git: bool,
    pub max_tick_seconds: u64,
    pub lockfile: String,
    #[serde(default)]
    pub runner_owned_globs: Vec<String>,
    pub crash_cleanup: CrashCleanup,
}

/// `planner_cli.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerCliConfig {
    pub command: Vec<String>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default)]
    pub no_session_persistence: bool,
}

/// `models.*`. Values are opaque identifiers passed through to the CLI
/// invocations untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub orchestrator: String,
    pub builder: String,
}

/// `orchestrator.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub max_turns: u32,
    pub permission_mode: String,
    pub system_prompt_file: String,
    pub user_prompt_file: String,
    pub task_schema_file: String,
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries_per_tick: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// `builder.interactive.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveBuilderConfig {
    pub max_turns: u32,
    pub permission_mode: String,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    pub system_prompt_file: String,
    pub user_prompt_file: String,
    pub builder_result_schema_file: String,
    #[serde(default)]
    pub strict_builder_json: bool,
}

/// `builder.patch.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchBuilderConfig {
    pub max_patch_attempts_per_milestone: u32,
}

/// `builder.external.*`, present only when the external-driver mode is
/// enabled for this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalBuilderConfig {
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_seconds: u64,
    pub output_file: String,
}

/// `builder.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub default_mode: String,
    #[serde(default)]
    pub allow_patch_mode: bool,
    pub interactive: InteractiveBuilderConfig,
    pub patch: PatchBuilderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalBuilderConfig>,
}

/// `scope.*`, the workspace-wide defaults a task's own `scope` block layers
/// on top of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDefaultsConfig {
    #[serde(default)]
    pub default_allowed_globs: Vec<String>,
    #[serde(default)]
    pub default_forbidden_globs: Vec<String>,
    #[serde(default = "default_true")]
    pub default_allow_new_files: bool,
    #[serde(default = "default_true")]
    pub default_allow_lockfile_changes: bool,
    #[serde(default)]
    pub lockfiles: Vec<String>,
}

/// `diff_limits.*` workspace defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLimitsDefaultsConfig {
    pub default_max_files_touched: u32,
    pub default_max_lines_changed: u32,
}

/// One named, parameterizable verification command (`verification.templates[]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTemplate {
    pub id: String,
    pub argv: Vec<String>,
    #[serde(default)]
    pub default_params: std::collections::HashMap<String, String>,
}

/// `verification.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_execution_mode")]
    pub execution_mode: String,
    pub max_param_len: usize,
    #[serde(default = "default_true")]
    pub reject_whitespace_in_params: bool,
    #[serde(default = "default_true")]
    pub reject_dotdot: bool,
    pub reject_metachars_regex: String,
    pub timeout_fast_seconds: u64,
    pub timeout_slow_seconds: u64,
    #[serde(default)]
    pub templates: Vec<VerificationTemplate>,
}

/// `budgets.per_milestone.*`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerMilestoneBudgets {
    pub max_ticks: u32,
    pub max_orchestrator_calls: u32,
    pub max_builder_calls: u32,
    pub max_verify_runs: u32,
    pub max_estimated_cost_usd: f64,
}

/// `budgets.*`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetsConfig {
    pub per_milestone: PerMilestoneBudgets,
    pub warn_at_fraction: f64,
}

/// `history.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub dir: String,
    pub max_mb: u64,
    #[serde(default = "default_true")]
    pub include_diff_patch: bool,
    #[serde(default = "default_true")]
    pub include_verify_log: bool,
}

fn default_log_level() -> String {
    "info".into()
}

/// `logging.*` (ambient; not part of the original config key list, added
/// so the runner's own log verbosity is configurable the way the rest of
/// the ambient stack is).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// The full runner configuration, as loaded from `<config-file>` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub workspace_dir: String,
    pub runner: RunnerConfig,
    pub planner_cli: PlannerCliConfig,
    pub models: ModelsConfig,
    pub orchestrator: OrchestratorConfig,
    pub builder: BuilderConfig,
    #[serde(default)]
    pub scope: ScopeDefaultsConfig,
    pub diff_limits: DiffLimitsDefaultsConfig,
    pub verification: VerificationConfig,
    pub budgets: BudgetsConfig,
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
