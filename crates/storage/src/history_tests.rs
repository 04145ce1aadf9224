// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn write_artifact_creates_run_dir_and_file() {
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history"), 500);
    store
        .write_artifact("run-1", "builder.log", b"hello")
        .expect("write");
    let path = store.run_dir("run-1").join("builder.log");
    assert_eq!(fs::read(&path).expect("read"), b"hello");
}

#[test]
fn total_size_mb_zero_when_empty() {
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history"), 500);
    assert_eq!(store.total_size_mb().expect("size"), 0);
}

#[test]
fn is_over_cap_detects_excess() {
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history"), 0);
    store
        .write_artifact("run-1", "log.txt", &vec![0u8; 2 * 1024 * 1024])
        .expect("write");
    assert!(store.is_over_cap().expect("check"));
}

#[test]
fn run_dirs_oldest_first_orders_by_mtime() {
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history"), 500);
    store.write_artifact("run-a", "x.txt", b"a").expect("write a");
    std::thread::sleep(std::time::Duration::from_millis(10));
    store.write_artifact("run-b", "x.txt", b"b").expect("write b");
    let dirs = store.run_dirs_oldest_first().expect("list");
    assert_eq!(dirs.len(), 2);
    assert!(dirs[0].ends_with("run-a"));
    assert!(dirs[1].ends_with("run-b"));
}

#[test]
fn remove_run_dir_deletes_contents() {
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history"), 500);
    store.write_artifact("run-1", "x.txt", b"a").expect("write");
    let run_dir = store.run_dir("run-1");
    store.remove_run_dir(&run_dir).expect("remove");
    assert!(!run_dir.exists());
}
