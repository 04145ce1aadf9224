use super::*;
use tick_core::config::{
    BuilderConfig, CrashCleanup, DiffLimitsDefaultsConfig, HistoryConfig, InteractiveBuilderConfig,
    ModelsConfig, OrchestratorConfig, PatchBuilderConfig, PlannerCliConfig, RunnerConfig,
    VerificationConfig,
};
use tick_core::Config;

fn base_config() -> Config {
    Config {
        workspace_dir: ".".to_string(),
        runner: RunnerConfig {
            require_git: true,
            max_tick_seconds: 600,
            lockfile: "LOCK.json".to_string(),
            runner_owned_globs: Vec::new(),
            crash_cleanup: CrashCleanup {
                delete_tmp_glob: "*.tmp".to_string(),
            },
        },
        planner_cli: PlannerCliConfig {
            command: vec!["claude".to_string()],
            output_format: "json".to_string(),
            no_session_persistence: false,
        },
        models: ModelsConfig {
            orchestrator: "orchestrator-model".to_string(),
            builder: "builder-model".to_string(),
        },
        orchestrator: OrchestratorConfig {
            max_turns: 40,
            permission_mode: "default".to_string(),
            system_prompt_file: "prompts/orchestrator_system.md".to_string(),
            user_prompt_file: "prompts/orchestrator_user.md".to_string(),
            task_schema_file: "schemas/task.schema.json".to_string(),
            max_parse_retries_per_tick: 1,
            timeout_seconds: None,
        },
        builder: BuilderConfig {
            default_mode: "interactive_agent".to_string(),
            allow_patch_mode: true,
            interactive: InteractiveBuilderConfig {
                max_turns: 40,
                permission_mode: "default".to_string(),
                allowed_tools: Vec::new(),
                system_prompt_file: "prompts/builder_system.md".to_string(),
                user_prompt_file: "prompts/builder_user.md".to_string(),
                builder_result_schema_file: "schemas/builder_result.schema.json".to_string(),
                strict_builder_json: false,
            },
            patch: PatchBuilderConfig {
                max_patch_attempts_per_milestone: 3,
            },
            external: None,
        },
        scope: Default::default(),
        diff_limits: DiffLimitsDefaultsConfig {
            default_max_files_touched: 20,
            default_max_lines_changed: 800,
        },
        verification: VerificationConfig {
            execution_mode: "argv_no_shell".to_string(),
            max_param_len: 200,
            reject_whitespace_in_params: true,
            reject_dotdot: true,
            reject_metachars_regex: r"[;&|`$()<>]".to_string(),
            timeout_fast_seconds: 60,
            timeout_slow_seconds: 600,
            templates: Vec::new(),
        },
        budgets: tick_core::config::BudgetsConfig {
            per_milestone: tick_core::config::PerMilestoneBudgets {
                max_ticks: 50,
                max_orchestrator_calls: 50,
                max_builder_calls: 50,
                max_verify_runs: 50,
                max_estimated_cost_usd: 10.0,
            },
            warn_at_fraction: 0.8,
        },
        history: HistoryConfig {
            enabled: true,
            dir: "history".to_string(),
            max_mb: 500,
            include_diff_patch: true,
            include_verify_log: true,
        },
        logging: Default::default(),
    }
}

#[test]
fn retry_count_zero_leaves_config_unchanged() {
    let config = base_config();
    let degraded = degrade_config(&config, 0);
    assert_eq!(degraded, config);
}

#[test]
fn retry_count_one_halves_turns_and_diff_caps_with_floors() {
    let config = base_config();
    let degraded = degrade_config(&config, 1);
    assert_eq!(degraded.orchestrator.max_turns, 20);
    assert_eq!(degraded.builder.interactive.max_turns, 20);
    assert_eq!(degraded.diff_limits.default_max_files_touched, 10);
    assert_eq!(degraded.diff_limits.default_max_lines_changed, 400);
    assert_eq!(degraded.builder.default_mode, "patch");
}

#[test]
fn floors_are_never_crossed_on_repeated_halving() {
    let mut config = base_config();
    config.orchestrator.max_turns = 6;
    config.builder.interactive.max_turns = 6;
    config.diff_limits.default_max_files_touched = 6;
    config.diff_limits.default_max_lines_changed = 120;

    let degraded = degrade_config(&config, 1);
    assert_eq!(degraded.orchestrator.max_turns, 5);
    assert_eq!(degraded.builder.interactive.max_turns, 5);
    assert_eq!(degraded.diff_limits.default_max_files_touched, 5);
    assert_eq!(degraded.diff_limits.default_max_lines_changed, 100);
}

#[test]
fn patch_mode_not_forced_when_workspace_disallows_it() {
    let mut config = base_config();
    config.builder.allow_patch_mode = false;
    let degraded = degrade_config(&config, 1);
    assert_eq!(degraded.builder.default_mode, "interactive_agent");
}
