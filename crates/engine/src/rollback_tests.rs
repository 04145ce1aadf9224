use super::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use tick_argv::CancelToken;
use tick_vcs::GitAdapter;

fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let run = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    };
    run(&["init", "--quiet", "--initial-branch=main"]);
    run(&["config", "user.email", "tick@example.com"]);
    run(&["config", "user.name", "tick"]);
    fs::write(dir.path().join("a.txt"), "one\n").expect("write a.txt");
    run(&["add", "."]);
    run(&["commit", "--quiet", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn rollback_restores_tracked_edits_and_removes_new_files() {
    let dir = init_repo();
    let adapter = GitAdapter::new(dir.path());
    let cancel = CancelToken::new();
    let base = adapter.head(&cancel).await.unwrap();

    fs::write(dir.path().join("a.txt"), "clobbered\n").unwrap();
    fs::write(dir.path().join("new.txt"), "brand new\n").unwrap();

    run(&adapter, &base, &cancel).await.expect("rollback");

    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "one\n");
    assert!(!dir.path().join("new.txt").exists());

    let status = adapter.status_porcelain(&cancel).await.unwrap();
    assert!(status.is_empty());
}

#[tokio::test]
async fn rollback_is_idempotent_on_an_already_clean_worktree() {
    let dir = init_repo();
    let adapter = GitAdapter::new(dir.path());
    let cancel = CancelToken::new();
    let base = adapter.head(&cancel).await.unwrap();

    run(&adapter, &base, &cancel).await.expect("first rollback");
    run(&adapter, &base, &cancel).await.expect("second rollback");
}
