// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tick state machine (C12, §4.12): the single entry point that drives
//! one tick end to end — LOCK, PREFLIGHT, ORCHESTRATE, BUILD, JUDGE, VERIFY,
//! REPORT, END — and always hands back exactly one [`Report`], regardless of
//! which phase it ended on.
//!
//! Two disk-write rules hold throughout:
//!
//! - `REPORT.json`/`REPORT.md`/`BLOCKED.json`/`STATE.json` are only ever
//!   written while the workspace lock is held. A tick that fails before the
//!   lock is acquired (config check, or the lock acquisition itself) still
//!   returns a fully-formed [`Report`] for the caller to act on, but never
//!   persists it — doing so would race whichever process actually holds the
//!   lock and is about to write its own.
//! - [`crate::degrade::degrade_config`] only ever touches fields the
//!   orchestrator/builder dispatch reads (turn ceilings, diff-limit
//!   defaults, the preferred builder mode); the judge and verifier read
//!   nothing `degrade_config` changes, so the same degraded [`Config`] is
//!   threaded through orchestrate, build, judge, and verify without any
//!   risk of silently loosening an enforcement bound.

use crate::config_loader::ConfigError;
use crate::degrade::degrade_config;
use crate::error::TickFailure;
use crate::judge::{self, effective_scope, JudgeOutcome};
use crate::preflight;
use crate::prompt::{self, PromptContext};
use crate::report_writer::{self, ReportArtifacts};
use crate::rollback;
use crate::state::{Phase, TickState};
use crate::verify::{self, VerifyError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use std::path::PathBuf;
use tick_adapters::{
    clamp_max_turns, dispatch_external, dispatch_interactive, dispatch_patch, dispatch_planner, BuilderError,
    BuilderOutcome, ExternalDispatchConfig, ExternalDriverProcess, InteractiveBuilderProcess, InteractiveDispatchConfig,
    PlannerDispatchConfig, PlannerDispatchError, PlannerProcess,
};
use tick_argv::CancelToken;
use tick_core::{
    BlastRadius, BudgetsReport, BuilderMode, Clock, Code, Config, DiffReport, Pointers, Report, RunId, ScopeReport,
    Task, VerificationPhase, VerificationReport, VerificationRunRecord, VerificationStatus, WorkspaceState,
};
use tick_schema::SchemaStore;
use tick_storage::{HistoryStore, LockManager, WorkspacePaths};
use tick_vcs::GitAdapter;

use crate::verify::VerifyStop;

/// Everything a tick needs, generic over the three process traits so tests
/// can substitute scripted fakes for real subprocesses without a single
/// `if cfg!(test)` anywhere in this module.
pub struct TickDeps<P, B, D, C> {
    pub planner: P,
    pub interactive_builder: B,
    pub external_driver: D,
    pub clock: C,
    pub git: GitAdapter,
    pub schema_store: SchemaStore,
    pub paths: WorkspacePaths,
    pub config_path: PathBuf,
    pub config_schema_path: PathBuf,
    pub cancel: CancelToken,
}

/// Drives one tick end to end (§4.12).
pub struct TickEngine<P, B, D, C> {
    deps: TickDeps<P, B, D, C>,
}

/// Everything [`TickEngine::finish`] needs to assemble and (usually) persist
/// the tick's [`Report`]. A plain struct rather than a long argument list,
/// since most call sites only fill in a handful of non-default fields.
struct ReportInput {
    base_commit: String,
    head_commit: Option<String>,
    task_summary: String,
    code: Code,
    blast_radius: BlastRadius,
    scope: ScopeReport,
    diff: DiffReport,
    verification: VerificationReport,
    pointers: Option<Pointers>,
    diff_patch: Option<String>,
}

/// Reconstruct a single synthetic [`VerificationRunRecord`] from a
/// [`VerifyStop`], since [`verify::run`] doesn't hand back the runs it
/// already completed alongside the error that stopped it (§4.9: the batch
/// aborts at the first failure, and that failure *is* the record worth
/// keeping). `Tainted`/`UnknownTemplate`/`InvalidMetacharRegex` reject
/// before any command ever runs, so there is nothing to record for them.
fn synthetic_verify_record(stop: &VerifyStop) -> Option<VerificationRunRecord> {
    match stop {
        VerifyStop::Tainted(_) | VerifyStop::UnknownTemplate { .. } | VerifyStop::InvalidMetacharRegex(_) => None,
        VerifyStop::FlakyOrTimeout { template_id, phase } => Some(VerificationRunRecord {
            template_id: template_id.clone(),
            phase: *phase,
            status: VerificationStatus::Timeout,
            exit_code: None,
            duration_ms: 0,
        }),
        VerifyStop::FailedFast { template_id, exit_code } => Some(VerificationRunRecord {
            template_id: template_id.clone(),
            phase: VerificationPhase::Fast,
            status: VerificationStatus::Fail,
            exit_code: *exit_code,
            duration_ms: 0,
        }),
        VerifyStop::FailedSlow { template_id, exit_code } => Some(VerificationRunRecord {
            template_id: template_id.clone(),
            phase: VerificationPhase::Slow,
            status: VerificationStatus::Fail,
            exit_code: *exit_code,
            duration_ms: 0,
        }),
    }
}

impl<P, B, D, C> TickEngine<P, B, D, C>
where
    P: PlannerProcess,
    B: InteractiveBuilderProcess,
    D: ExternalDriverProcess,
    C: Clock,
{
    pub fn new(deps: TickDeps<P, B, D, C>) -> Self {
        Self { deps }
    }

    /// Run exactly one tick. Always returns a [`Report`] — every branch of
    /// the state machine ends by assembling one, whether or not it could
    /// also be persisted to disk (see the module doc for when it can't).
    pub async fn run_tick(&self) -> Report {
        let started_at = self.deps.clock.now();
        let run_id = RunId::generate();
        let mut tick_state = TickState::new(run_id, started_at);

        // Check 1 (§4.5): config load, which runs before the lock since the
        // lockfile path itself lives inside the config.
        let config = match preflight::run_config_check(&self.deps.config_path, &self.deps.schema_store, &self.deps.config_schema_path) {
            Ok(config) => config,
            Err(blocked) => {
                tracing::error!(error = %blocked, "config check failed before the workspace lock could be acquired");
                let ended_at = self.deps.clock.now();
                return self.bare_report(&tick_state, ended_at, blocked.code(), blocked.to_string());
            }
        };

        tick_state.enter(Phase::Lock);
        let lock_path = self.deps.paths.workspace_dir().join(&config.runner.lockfile);
        let lock_manager = LockManager::new(tick_storage::boot_id());
        let lock_guard = match lock_manager.acquire(&lock_path) {
            Ok(guard) => guard,
            Err(error) => {
                tracing::warn!(error = %error, "could not acquire the workspace lock");
                let ended_at = self.deps.clock.now();
                return self.bare_report(&tick_state, ended_at, Code::BlockedLockHeld, error.to_string());
            }
        };

        let report = self.run_locked(tick_state, config).await;
        drop(lock_guard);
        report
    }

    /// Build an in-memory-only report for a failure that occurred before
    /// the workspace lock was held — never written to disk (module doc).
    fn bare_report(&self, tick_state: &TickState, ended_at: DateTime<Utc>, code: Code, reason: String) -> Report {
        Report::new(
            tick_state.run_id.clone(),
            tick_state.started_at,
            ended_at,
            "unknown".to_string(),
            None,
            reason,
            code,
            BlastRadius::default(),
            ScopeReport::default(),
            DiffReport::default(),
            VerificationReport::default(),
            BudgetsReport::default(),
            None,
        )
    }

    async fn best_effort_head(&self) -> String {
        self.deps.git.head(&self.deps.cancel).await.unwrap_or_else(|_| "unknown".to_string())
    }

    fn empty_verification(&self, config: &Config) -> VerificationReport {
        VerificationReport {
            exec_mode: config.verification.execution_mode.clone(),
            runs: Vec::new(),
            log_path: None,
        }
    }

    /// On a final planner failure, snapshot every attempt's raw stdout,
    /// stderr, and rejection reason under `history/<run_id>/planner/`,
    /// plus a `meta.json` summary — the debug trail an operator needs to
    /// tell a flaky planner apart from a genuinely malformed prompt
    /// (§4.6). A no-op when history is disabled or the failure wasn't a
    /// planner one; other failure kinds carry no raw output to save.
    fn write_planner_debug_artifacts(
        &self,
        history: &HistoryStore,
        config: &Config,
        run_id: &tick_core::RunId,
        failure: &TickFailure,
    ) -> Option<Pointers> {
        if !config.history.enabled {
            return None;
        }
        let TickFailure::Planner(PlannerDispatchError::Invalid { attempts, failures }) = failure else {
            return None;
        };

        let run_id = run_id.as_str();
        let dir_name = "planner";
        let mut meta_attempts = Vec::with_capacity(failures.len());
        for (index, attempt) in failures.iter().enumerate() {
            let n = index + 1;
            let _ = history.write_artifact(run_id, &format!("{dir_name}/attempt_{n}_stdout.txt"), attempt.raw.stdout.as_bytes());
            let _ = history.write_artifact(run_id, &format!("{dir_name}/attempt_{n}_stderr.txt"), attempt.raw.stderr.as_bytes());
            let _ = history.write_artifact(run_id, &format!("{dir_name}/attempt_{n}_reason.txt"), attempt.reason.as_bytes());
            meta_attempts.push(serde_json::json!({
                "attempt": n,
                "exit_code": attempt.raw.exit_code,
                "reason": attempt.reason,
            }));
        }
        let meta = serde_json::json!({
            "attempts_allowed": attempts,
            "attempts_made": failures.len(),
            "attempts": meta_attempts,
        });
        if let Ok(meta_bytes) = serde_json::to_vec_pretty(&meta) {
            let _ = history.write_artifact(run_id, &format!("{dir_name}/meta.json"), &meta_bytes);
        }

        Some(Pointers {
            planner_debug_dir: Some(format!("history/{run_id}/{dir_name}")),
            builder_debug_dir: None,
        })
    }

    /// PREFLIGHT through REPORT (§4.5–§4.11), run under the workspace lock.
    async fn run_locked(&self, mut tick_state: TickState, config: Config) -> Report {
        let mut workspace_state: WorkspaceState =
            tick_storage::read_json_optional(&self.deps.paths.state_json()).unwrap_or(None).unwrap_or_default();
        let history = HistoryStore::new(self.deps.paths.history_dir(), config.history.max_mb);

        tick_state.enter(Phase::Preflight);
        let preflight_ok = match preflight::run_preflight(&config, &self.deps.git, &history, &workspace_state, &self.deps.cancel).await {
            Ok(ok) => ok,
            Err(blocked) => {
                let base_commit = self.best_effort_head().await;
                let input = ReportInput {
                    base_commit,
                    head_commit: None,
                    task_summary: blocked.to_string(),
                    code: blocked.code(),
                    blast_radius: BlastRadius::default(),
                    scope: ScopeReport::default(),
                    diff: DiffReport::default(),
                    verification: self.empty_verification(&config),
                    pointers: None,
                    diff_patch: None,
                };
                return self.finish(&tick_state, &config, &mut workspace_state, input, false).await;
            }
        };
        let base_commit = preflight_ok.base_commit.clone();
        tick_state.base_commit = Some(base_commit.clone());
        for warning in &preflight_ok.warnings {
            tracing::warn!(%warning, "preflight warning");
        }

        // Crash-recovery gate (§4.12): `retry_count >= 2` blocks the tick
        // before the planner is ever consulted (degrade.rs leaves this to
        // the caller by design).
        if workspace_state.retry_count >= 2 {
            tracing::error!(retry_count = workspace_state.retry_count, "crash recovery required, refusing to consult the planner");
            let input = ReportInput {
                base_commit,
                head_commit: None,
                task_summary: "tick blocked: repeated failures require operator crash recovery before another attempt"
                    .to_string(),
                code: Code::BlockedCrashRecoveryRequired,
                blast_radius: BlastRadius::default(),
                scope: ScopeReport::default(),
                diff: DiffReport::default(),
                verification: self.empty_verification(&config),
                pointers: None,
                diff_patch: None,
            };
            return self.finish(&tick_state, &config, &mut workspace_state, input, false).await;
        }

        let degraded = degrade_config(&config, workspace_state.retry_count);

        tick_state.enter(Phase::Orchestrate);
        let task = match self.dispatch_orchestrator(&degraded, &workspace_state).await {
            Ok(task) => task,
            Err(failure) => {
                let pointers = self.write_planner_debug_artifacts(&history, &config, &tick_state.run_id, &failure);
                let input = ReportInput {
                    base_commit,
                    head_commit: None,
                    task_summary: failure.to_string(),
                    code: failure.code(),
                    blast_radius: BlastRadius::default(),
                    scope: ScopeReport::default(),
                    diff: DiffReport::default(),
                    verification: self.empty_verification(&config),
                    pointers,
                    diff_patch: None,
                };
                return self.finish(&tick_state, &config, &mut workspace_state, input, true).await;
            }
        };
        workspace_state.set_milestone(task.milestone_id.clone());
        workspace_state.budgets.orchestrator_calls += 1;
        tick_state.task = Some(task.clone());

        tick_state.enter(Phase::Build);
        let builder_outcome = match self.dispatch_builder(&degraded, &task).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                workspace_state.budgets.builder_calls += 1;
                return self
                    .finish_after_builder(&tick_state, &config, &mut workspace_state, base_commit, failure, None, self.empty_verification(&config))
                    .await;
            }
        };
        workspace_state.budgets.builder_calls += 1;
        if let BuilderOutcome::Ran { result } = &builder_outcome {
            tick_state.builder_result = result.clone();
        }

        tick_state.enter(Phase::Judge);
        let judge_outcome = match judge::run(&task, &degraded, &self.deps.git, &base_commit, &self.deps.cancel).await {
            Ok(outcome) => outcome,
            Err(error) => {
                return self
                    .finish_after_builder(&tick_state, &config, &mut workspace_state, base_commit, TickFailure::from(error), None, self.empty_verification(&config))
                    .await;
            }
        };

        tick_state.enter(Phase::Verify);
        let verify_result = verify::run(&task, &degraded, self.deps.git.repo_root(), &self.deps.cancel).await;
        let verify_run_count: u32 = match &verify_result {
            Ok(outcome) => outcome.runs.len() as u32,
            Err(_) => 1,
        };
        workspace_state.budgets.verify_runs += verify_run_count;

        tick_state.enter(Phase::Report);
        match verify_result {
            Ok(outcome) => {
                self.finish_success(&tick_state, &config, &mut workspace_state, base_commit, task, judge_outcome, outcome.runs)
                    .await
            }
            Err(VerifyError::Cancelled) => {
                self.finish_after_builder(
                    &tick_state,
                    &config,
                    &mut workspace_state,
                    base_commit,
                    TickFailure::Cancelled,
                    Some(judge_outcome),
                    self.empty_verification(&config),
                )
                .await
            }
            Err(VerifyError::Stop(stop)) => {
                let verification = VerificationReport {
                    exec_mode: config.verification.execution_mode.clone(),
                    runs: synthetic_verify_record(&stop).into_iter().collect(),
                    log_path: None,
                };
                self.finish_after_builder(
                    &tick_state,
                    &config,
                    &mut workspace_state,
                    base_commit,
                    TickFailure::Verify(stop),
                    Some(judge_outcome),
                    verification,
                )
                .await
            }
        }
    }

    /// Gather everything the orchestrator's prompt template can reference
    /// (§4.6) and dispatch the planner, returning the task it proposed.
    async fn dispatch_orchestrator(&self, config: &Config, workspace_state: &WorkspaceState) -> Result<Task, TickFailure> {
        let status = self.deps.git.status_porcelain(&self.deps.cancel).await.unwrap_or_default();
        let verification_template_ids: Vec<String> = config.verification.templates.iter().map(|t| t.id.clone()).collect();
        let workspace_dir = self.deps.paths.workspace_dir();
        let facts = prompt::read_optional_doc(&workspace_dir.join("FACTS.md"));
        let plan = prompt::read_optional_doc(&workspace_dir.join("PLAN.md"));
        let roadmap = prompt::read_optional_doc(&workspace_dir.join("ROADMAP.md"));
        let last_report: Option<Report> = tick_storage::read_json_optional(&self.deps.paths.report_json()).unwrap_or(None);
        let last_report_summary = last_report.as_ref().map(|r| r.task_summary.clone());
        let retry_reason = if workspace_state.retry_count > 0 {
            Some(format!(
                "the previous tick ended in STOP or BLOCKED; this is attempt {} for the active milestone",
                workspace_state.retry_count + 1
            ))
        } else {
            None
        };

        let ctx = PromptContext {
            milestone_id: workspace_state.milestone_id.as_ref(),
            state: workspace_state,
            caps: &config.budgets.per_milestone,
            verification_template_ids: &verification_template_ids,
            worktree_status: &status,
            facts: facts.as_deref(),
            plan: plan.as_deref(),
            roadmap: roadmap.as_deref(),
            last_report_summary: last_report_summary.as_deref(),
            retry_reason: retry_reason.as_deref(),
        };

        let user_template_path = workspace_dir.join(&config.orchestrator.user_prompt_file);
        let user_template = std::fs::read_to_string(&user_template_path)
            .map_err(|_| TickFailure::from(ConfigError::Missing(user_template_path.clone())))?;
        let rendered = prompt::build(&user_template, &ctx);

        let system_prompt_path = workspace_dir.join(&config.orchestrator.system_prompt_file);
        let system_prompt = std::fs::read_to_string(&system_prompt_path)
            .map_err(|_| TickFailure::from(ConfigError::Missing(system_prompt_path.clone())))?;
        let full_prompt = format!("{system_prompt}\n\n{rendered}");

        let task_schema_path = workspace_dir.join(&config.orchestrator.task_schema_file);
        let timeout = config
            .orchestrator
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(config.runner.max_tick_seconds));

        let dispatch_cfg = PlannerDispatchConfig {
            command: config.planner_cli.command.clone(),
            model: config.models.orchestrator.clone(),
            permission_mode: config.orchestrator.permission_mode.clone(),
            max_turns: config.orchestrator.max_turns,
            timeout,
            max_parse_retries: config.orchestrator.max_parse_retries_per_tick,
            cwd: self.deps.git.repo_root().to_path_buf(),
        };

        let task =
            dispatch_planner(&self.deps.planner, &self.deps.schema_store, &task_schema_path, &full_prompt, &dispatch_cfg, &self.deps.cancel)
                .await?;
        Ok(task)
    }

    /// Run the builder flavor `task.builder.mode` names (§4.7).
    async fn dispatch_builder(&self, config: &Config, task: &Task) -> Result<BuilderOutcome, TickFailure> {
        let workspace_dir = self.deps.paths.workspace_dir();
        let repo_root = self.deps.git.repo_root().to_path_buf();
        let tick_timeout = Duration::from_secs(config.runner.max_tick_seconds);

        match task.builder.mode {
            BuilderMode::InteractiveAgent => {
                let max_turns = clamp_max_turns(task.builder.max_turns, config.builder.interactive.max_turns);
                let system_prompt_path = workspace_dir.join(&config.builder.interactive.system_prompt_file);
                let system_prompt = std::fs::read_to_string(&system_prompt_path).unwrap_or_default();
                let user_template_path = workspace_dir.join(&config.builder.interactive.user_prompt_file);
                let user_template = std::fs::read_to_string(&user_template_path)
                    .map_err(|_| TickFailure::from(ConfigError::Missing(user_template_path.clone())))?;
                let full_prompt = prompt::build_builder_prompt(&system_prompt, &user_template, &task.builder.instructions);

                let schema_path = workspace_dir.join(&config.builder.interactive.builder_result_schema_file);
                let cfg = InteractiveDispatchConfig {
                    command: config.planner_cli.command.clone(),
                    model: config.models.builder.clone(),
                    permission_mode: config.builder.interactive.permission_mode.clone(),
                    allowed_tools: config.builder.interactive.allowed_tools.clone(),
                    max_turns,
                    timeout: tick_timeout,
                    strict_builder_json: config.builder.interactive.strict_builder_json,
                    cwd: repo_root,
                };
                let outcome = dispatch_interactive(
                    &self.deps.interactive_builder,
                    &self.deps.schema_store,
                    &schema_path,
                    &full_prompt,
                    &cfg,
                    &self.deps.cancel,
                )
                .await?;
                Ok(outcome)
            }
            BuilderMode::Patch => {
                if !config.builder.allow_patch_mode {
                    return Err(TickFailure::from(BuilderError::PatchScopeViolation(
                        "patch mode is disabled for this workspace".to_string(),
                    )));
                }
                let patch = task.builder.patch.as_deref().unwrap_or_default();
                let scope = effective_scope(config, &task.scope);
                let outcome = dispatch_patch(&repo_root, patch, &scope, tick_timeout, &self.deps.cancel).await?;
                Ok(outcome)
            }
            BuilderMode::ExternalDriver => {
                let external = config.builder.external.as_ref().ok_or_else(|| {
                    TickFailure::from(BuilderError::TaskFileUnwritable {
                        path: workspace_dir.join(tick_adapters::TASK_FILE_NAME),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "builder.external is not configured for this workspace"),
                    })
                })?;
                let schema_path = workspace_dir.join(&config.builder.interactive.builder_result_schema_file);
                let cfg = ExternalDispatchConfig {
                    command: external.command.clone(),
                    args: external.args.clone(),
                    timeout: Duration::from_secs(external.timeout_seconds),
                    output_file: external.output_file.clone(),
                    workspace_root: repo_root,
                };
                let outcome =
                    dispatch_external(&self.deps.external_driver, &self.deps.schema_store, &schema_path, task, &cfg, &self.deps.cancel).await?;
                Ok(outcome)
            }
        }
    }

    /// Assemble the report for any failure reached once the builder has run
    /// (§4.10, §4.12): roll the worktree back to `base_commit` first, and
    /// escalate to `STOP_INTERRUPTED` if even that fails.
    async fn finish_after_builder(
        &self,
        tick_state: &TickState,
        config: &Config,
        workspace_state: &mut WorkspaceState,
        base_commit: String,
        failure: TickFailure,
        judge_outcome: Option<JudgeOutcome>,
        verification: VerificationReport,
    ) -> Report {
        let mut code = failure.code();
        let mut reason = failure.to_string();
        let mut head_commit = self.deps.git.head(&self.deps.cancel).await.ok();

        if failure.builder_ran() {
            match rollback::run(&self.deps.git, &base_commit, &self.deps.cancel).await {
                Ok(()) => head_commit = Some(base_commit.clone()),
                Err(rollback_error) => {
                    tracing::error!(error = %rollback_error, "rollback failed after a tick failure");
                    code = Code::StopInterrupted;
                    reason = format!("{reason}; rollback failed: {rollback_error}");
                }
            }
        }

        let (blast_radius, scope) = match judge_outcome {
            Some(outcome) => (outcome.blast_radius, outcome.scope),
            None => (BlastRadius::default(), ScopeReport::default()),
        };

        let input = ReportInput {
            base_commit,
            head_commit,
            task_summary: reason,
            code,
            blast_radius,
            scope,
            diff: DiffReport::default(),
            verification,
            pointers: None,
            diff_patch: None,
        };
        self.finish(tick_state, config, workspace_state, input, true).await
    }

    /// Assemble the report for a clean tick (§4.8–§4.11): the judge's
    /// verdict and the verifier's run log both pass.
    async fn finish_success(
        &self,
        tick_state: &TickState,
        config: &Config,
        workspace_state: &mut WorkspaceState,
        base_commit: String,
        task: Task,
        judge_outcome: JudgeOutcome,
        verify_runs: Vec<VerificationRunRecord>,
    ) -> Report {
        let head_commit = self.deps.git.head(&self.deps.cancel).await.ok();
        let blast_radius = judge_outcome.blast_radius;
        let lines_changed = blast_radius.lines_added + blast_radius.lines_deleted;
        let files_changed = blast_radius.files_touched;

        let include_patch = config.history.enabled && config.history.include_diff_patch;
        let diff_patch = if include_patch {
            self.deps.git.diff_patch(&base_commit, &self.deps.cancel).await.ok()
        } else {
            None
        };
        let patch_path = diff_patch.as_ref().map(|_| format!("history/{}/diff.patch", tick_state.run_id));

        let task_summary = format!("{:?} [{}]: {}", task.task_kind, task.task_id, task.intent);

        let input = ReportInput {
            base_commit,
            head_commit,
            task_summary,
            code: Code::Success,
            blast_radius,
            scope: judge_outcome.scope,
            diff: DiffReport {
                files_changed,
                lines_changed,
                patch_path,
            },
            verification: VerificationReport {
                exec_mode: config.verification.execution_mode.clone(),
                runs: verify_runs,
                log_path: None,
            },
            pointers: None,
            diff_patch,
        };
        self.finish(tick_state, config, workspace_state, input, false).await
    }

    /// Assemble, write, and account for the tick's terminal [`Report`]
    /// (§4.11, §4.15, §4.16): every call site — success or failure — funnels
    /// through here exactly once.
    async fn finish(
        &self,
        tick_state: &TickState,
        config: &Config,
        workspace_state: &mut WorkspaceState,
        input: ReportInput,
        bump_retry_on_failure: bool,
    ) -> Report {
        let ended_at = self.deps.clock.now();
        let code = input.code;

        workspace_state.record_tick(tick_state.run_id.clone());
        workspace_state.update_budget_warning(&config.budgets.per_milestone, config.budgets.warn_at_fraction);
        if code == Code::Success {
            workspace_state.retry_count = 0;
        } else if bump_retry_on_failure {
            workspace_state.retry_count = workspace_state.retry_count.saturating_add(1);
        }

        let budgets_report = BudgetsReport {
            milestone_id: workspace_state.milestone_id.clone(),
            ticks: workspace_state.budgets.ticks,
            orchestrator_calls: workspace_state.budgets.orchestrator_calls,
            builder_calls: workspace_state.budgets.builder_calls,
            verify_runs: workspace_state.budgets.verify_runs,
            estimated_cost_usd: workspace_state.budgets.estimated_cost_usd,
            warnings: if workspace_state.budget_warning {
                vec!["milestone budget is nearing its configured cap".to_string()]
            } else {
                Vec::new()
            },
        };

        let report = Report::new(
            tick_state.run_id.clone(),
            tick_state.started_at,
            ended_at,
            input.base_commit,
            input.head_commit,
            input.task_summary,
            code,
            input.blast_radius,
            input.scope,
            input.diff,
            input.verification,
            budgets_report,
            input.pointers,
        );

        let history = HistoryStore::new(self.deps.paths.history_dir(), config.history.max_mb);
        let artifacts = ReportArtifacts {
            diff_patch: input.diff_patch.as_deref(),
            verify_log: None,
        };
        let report = match report_writer::write_report(&self.deps.paths, &history, &config.history, &report, artifacts) {
            Ok(()) => report,
            Err(error) => {
                tracing::error!(%error, "failed to persist the tick report; escalating to STOP_INTERRUPTED");
                let mut escalated = report;
                escalated.code = Code::StopInterrupted;
                escalated.verdict = escalated.code.verdict();
                let _ = tick_storage::write_json_atomic(&self.deps.paths.blocked_json(), &escalated);
                escalated
            }
        };

        workspace_state.last_verdict = Some(report.verdict);
        if let Err(error) = tick_storage::write_json_atomic(&self.deps.paths.state_json(), workspace_state) {
            tracing::error!(%error, "failed to persist workspace state");
        }

        report
    }
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
