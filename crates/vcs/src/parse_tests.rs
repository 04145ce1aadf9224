// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn porcelain_parses_modified_and_untracked() {
    let text = " M src/a.rs\n?? src/new.rs\n";
    let entries = parse_porcelain_status(text);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, "src/a.rs");
    assert!(!entries[0].is_untracked());
    assert_eq!(entries[1].path, "src/new.rs");
    assert!(entries[1].is_untracked());
}

#[test]
fn porcelain_parses_rename_arrow() {
    let text = "R  old.rs -> new.rs\n";
    let entries = parse_porcelain_status(text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "new.rs");
    assert_eq!(entries[0].renamed_from.as_deref(), Some("old.rs"));
}

#[test]
fn porcelain_skips_blank_and_short_lines() {
    let text = "\n\nXY\n";
    assert!(parse_porcelain_status(text).is_empty());
}

#[parameterized(
    modified = { "M\tsrc/a.rs", NameStatusEntry::Modified("src/a.rs".to_string()) },
    added = { "A\tsrc/b.rs", NameStatusEntry::Added("src/b.rs".to_string()) },
    deleted = { "D\tsrc/c.rs", NameStatusEntry::Deleted("src/c.rs".to_string()) },
)]
fn name_status_parses_simple_lines(line: &str, expected: NameStatusEntry) {
    assert_eq!(parse_name_status(line), vec![expected]);
}

#[test]
fn name_status_parses_rename_with_score() {
    let entries = parse_name_status("R87\told.rs\tnew.rs");
    assert_eq!(
        entries,
        vec![NameStatusEntry::Renamed("old.rs".into(), "new.rs".into(), 87)]
    );
}

#[test]
fn name_status_skips_copy_lines() {
    assert!(parse_name_status("C100\told.rs\tnew.rs").is_empty());
}

#[test]
fn numstat_parses_added_deleted_path() {
    let entries = parse_numstat("3\t1\tsrc/a.rs\n");
    assert_eq!(
        entries,
        vec![NumstatEntry { added: 3, deleted: 1, path: "src/a.rs".into() }]
    );
}

#[test]
fn numstat_treats_binary_dash_as_zero() {
    let entries = parse_numstat("-\t-\tbinary.png\n");
    assert_eq!(entries[0].added, 0);
    assert_eq!(entries[0].deleted, 0);
}
