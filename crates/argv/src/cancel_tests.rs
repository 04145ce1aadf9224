// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn starts_not_cancelled() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancel_is_idempotent() {
    let token = CancelToken::new();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn cancelled_resolves_immediately_if_already_cancelled() {
    let token = CancelToken::new();
    token.cancel();
    tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled())
        .await
        .expect("cancelled() should resolve without waiting");
}

#[tokio::test]
async fn cancelled_resolves_once_cancel_is_called_from_a_clone() {
    let token = CancelToken::new();
    let clone = token.clone();
    let waiter = tokio::spawn(async move {
        token.cancelled().await;
    });
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    clone.cancel();
    tokio::time::timeout(std::time::Duration::from_millis(200), waiter)
        .await
        .expect("waiter should complete")
        .expect("task should not panic");
}
