// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::{MilestoneId, TaskId};
use crate::task::{BuilderMode, BuilderSpec, DiffLimits, Scope, TaskKind, VerificationSpec};

fn sample() -> Task {
    Task {
        task_id: TaskId::new("t1"),
        milestone_id: MilestoneId::new("m1"),
        task_kind: TaskKind::Execute,
        intent: "add a feature".into(),
        question: None,
        scope: Scope::default(),
        diff_limits: DiffLimits {
            max_files_touched: 10,
            max_lines_changed: 200,
        },
        verification: VerificationSpec::default(),
        builder: BuilderSpec {
            mode: BuilderMode::InteractiveAgent,
            max_turns: 10,
            instructions: "do it".into(),
            patch: None,
        },
    }
}

#[test]
fn fingerprint_is_deterministic() {
    let task = sample();
    assert_eq!(task_fingerprint(&task), task_fingerprint(&task));
}

#[test]
fn fingerprint_is_64_hex_chars() {
    let digest = task_fingerprint(&sample());
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn fingerprint_changes_with_semantic_field() {
    let mut other = sample();
    other.intent = "add a different feature".into();
    assert_ne!(task_fingerprint(&sample()), task_fingerprint(&other));
}

#[test]
fn fingerprint_stable_across_reserialization() {
    let task = sample();
    let json = serde_json::to_string(&task).expect("serialize");
    let reparsed: Task = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(task_fingerprint(&task), task_fingerprint(&reparsed));
}
