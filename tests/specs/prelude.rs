//! Black-box test helpers for the `tick` CLI.
//!
//! Every scenario here drives the compiled binary as an external process
//! and asserts only on its observable surface: exit code, stdout, and the
//! files it leaves on disk. No crate-internal type is ever touched.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Output};

/// A permissive JSON Schema accepted by every fixture document — the
/// schema layer is exercised by the crate's own unit tests, so these
/// black-box fixtures only need a shape contract that never rejects.
pub const PERMISSIVE_SCHEMA: &str = r#"{"type":"object"}"#;

/// Full, valid runner configuration. `workspace_dir` is `.` so every
/// runner-owned path lands at the project root alongside the fixtures
/// written by [`Project::new`].
pub const BASE_CONFIG: &str = r#"{
  "workspace_dir": ".",
  "runner": {
    "require_git": true,
    "max_tick_seconds": 600,
    "lockfile": "lock.json",
    "runner_owned_globs": ["REPORT.json", "REPORT.md", "STATE.json", "TASK.json", "BLOCKED.json", "lock.json", "history/**", "schemas/**", "prompts/**"],
    "crash_cleanup": { "delete_tmp_glob": "*.tmp" }
  },
  "planner_cli": {
    "command": ["tick-planner-stub"],
    "output_format": "json",
    "no_session_persistence": true
  },
  "models": {
    "orchestrator": "orchestrator-model",
    "builder": "builder-model"
  },
  "orchestrator": {
    "max_turns": 10,
    "permission_mode": "default",
    "system_prompt_file": "prompts/orchestrator_system.md",
    "user_prompt_file": "prompts/orchestrator_user.md",
    "task_schema_file": "schemas/task.schema.json",
    "max_parse_retries_per_tick": 1
  },
  "builder": {
    "default_mode": "interactive_agent",
    "allow_patch_mode": true,
    "interactive": {
      "max_turns": 10,
      "permission_mode": "default",
      "allowed_tools": [],
      "system_prompt_file": "prompts/builder_system.md",
      "user_prompt_file": "prompts/builder_user.md",
      "builder_result_schema_file": "schemas/builder_result.schema.json",
      "strict_builder_json": false
    },
    "patch": { "max_patch_attempts_per_milestone": 3 }
  },
  "diff_limits": {
    "default_max_files_touched": 20,
    "default_max_lines_changed": 800
  },
  "verification": {
    "execution_mode": "argv_no_shell",
    "max_param_len": 200,
    "reject_whitespace_in_params": true,
    "reject_dotdot": true,
    "reject_metachars_regex": "[;&|`$()<>]",
    "timeout_fast_seconds": 30,
    "timeout_slow_seconds": 300,
    "templates": []
  },
  "budgets": {
    "per_milestone": {
      "max_ticks": 50,
      "max_orchestrator_calls": 50,
      "max_builder_calls": 50,
      "max_verify_runs": 50,
      "max_estimated_cost_usd": 10.0
    },
    "warn_at_fraction": 0.8
  },
  "history": {
    "enabled": true,
    "dir": "history",
    "max_mb": 500,
    "include_diff_patch": true,
    "include_verify_log": true
  }
}"#;

/// Returns a [`Command`] for the `tick` binary under test, resolved via
/// `CARGO_BIN_EXE_tick` by `assert_cmd`.
pub fn tick_cmd() -> Command {
    Command::cargo_bin("tick").expect("tick binary should be built by cargo test")
}

/// A temporary project directory, pre-populated with a clean git repo and
/// the runner's well-known fixture files (config, schemas, prompts).
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    /// An empty directory: no git repo, no config. Used for scenarios that
    /// must fail before the engine ever looks at version control.
    pub fn bare() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// A clean git repository with one commit, plus the full set of
    /// runner fixture files (config, permissive schemas, empty-placeholder
    /// prompts) written under the repo root.
    pub fn new() -> Self {
        let project = Self::bare();
        project.git_init();
        project.write_fixtures();
        project.git_commit_all("initial");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git_init(&self) {
        self.run_git(&["init", "--quiet", "--initial-branch=main"]);
        self.run_git(&["config", "user.email", "tick@example.com"]);
        self.run_git(&["config", "user.name", "tick"]);
    }

    pub fn git_commit_all(&self, message: &str) {
        self.run_git(&["add", "."]);
        self.run_git(&["commit", "--quiet", "-m", message]);
    }

    fn run_git(&self, args: &[&str]) {
        let status = StdCommand::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    }

    /// Write a file relative to the project root, creating parent
    /// directories as needed.
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full = self.dir.path().join(path.as_ref());
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    fn write_fixtures(&self) {
        self.file("tick.config.json", BASE_CONFIG);
        self.file("config.schema.json", PERMISSIVE_SCHEMA);
        self.file("schemas/task.schema.json", PERMISSIVE_SCHEMA);
        self.file("schemas/builder_result.schema.json", PERMISSIVE_SCHEMA);
        self.file("prompts/orchestrator_system.md", "You are the planner.\n");
        self.file("prompts/orchestrator_user.md", "Milestone: {{milestone}}\n");
        self.file("prompts/builder_system.md", "You are the builder.\n");
        self.file("prompts/builder_user.md", "{{instructions}}\n");
    }

    /// Run `tick run` in this project, returning the raw process output.
    pub fn run_tick(&self) -> Output {
        tick_cmd().current_dir(self.path()).arg("run").output().expect("tick run should spawn")
    }

    pub fn report_json_path(&self) -> PathBuf {
        self.path().join("REPORT.json")
    }

    pub fn lock_json_path(&self) -> PathBuf {
        self.path().join("lock.json")
    }
}

/// Stdout/stderr/exit-code assertions over a finished process, in the
/// style used throughout this crate's behavioral specs.
pub trait OutputAssertions {
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;

    fn assert_exit_code(&self, expected: i32) -> &Self
    where
        Self: Sized,
    {
        let actual = self.exit_code();
        assert_eq!(actual, Some(expected), "unexpected exit code (stdout: {}, stderr: {})", self.stdout_string(), self.stderr_string());
        self
    }

    fn exit_code(&self) -> Option<i32>;

    fn assert_stdout_has(&self, expected: &str) -> &Self
    where
        Self: Sized,
    {
        let stdout = self.stdout_string();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    fn assert_stderr_has(&self, expected: &str) -> &Self
    where
        Self: Sized,
    {
        let stderr = self.stderr_string();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

impl OutputAssertions for Output {
    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}
