// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn all_excludes_deleted_paths() {
    let set = TouchedSet {
        modified: vec!["a.rs".into()],
        added: vec!["b.rs".into()],
        deleted: vec!["c.rs".into()],
        renamed: vec![],
        untracked: vec![],
    };
    assert_eq!(set.all(), vec!["a.rs".to_string(), "b.rs".to_string()]);
}

#[test]
fn all_includes_only_rename_destination() {
    let set = TouchedSet {
        renamed: vec![("old.rs".into(), "new.rs".into())],
        ..Default::default()
    };
    assert_eq!(set.all(), vec!["new.rs".to_string()]);
    assert!(!set.all().contains(&"old.rs".to_string()));
}

#[test]
fn all_dedupes_and_sorts() {
    let set = TouchedSet {
        modified: vec!["z.rs".into(), "a.rs".into()],
        untracked: vec!["a.rs".into()],
        ..Default::default()
    };
    assert_eq!(set.all(), vec!["a.rs".to_string(), "z.rs".to_string()]);
}

#[test]
fn new_paths_excludes_modified() {
    let set = TouchedSet {
        modified: vec!["a.rs".into()],
        added: vec!["b.rs".into()],
        untracked: vec!["c.rs".into()],
        renamed: vec![("old.rs".into(), "d.rs".into())],
        ..Default::default()
    };
    let mut new_paths = set.new_paths();
    new_paths.sort();
    assert_eq!(
        new_paths,
        vec!["b.rs".to_string(), "c.rs".to_string(), "d.rs".to_string()]
    );
}

#[test]
fn is_empty_true_for_default() {
    assert!(TouchedSet::default().is_empty());
}
