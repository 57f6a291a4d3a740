// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::*;

#[tokio::test]
async fn create_session_then_new_window_allocates_sequential_indices() {
    let adapter = FakeSessionAdapter::new();
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    let idx = adapter.new_window("acme", "developer", Path::new("/tmp")).await.unwrap();
    assert_eq!(idx, 1);
    assert!(adapter.window_exists(&SessionTarget::new("acme", 0)).await.unwrap());
    assert!(adapter.window_exists(&SessionTarget::new("acme", 1)).await.unwrap());
}

#[tokio::test]
async fn new_window_on_missing_session_errors() {
    let adapter = FakeSessionAdapter::new();
    let err = adapter.new_window("ghost", "developer", Path::new("/tmp")).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionNotFound(_)));
}

#[tokio::test]
async fn send_literal_appends_to_pane_and_capture_reads_it_back() {
    let adapter = FakeSessionAdapter::new();
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("acme", 0);
    adapter.send_literal(&target, "hello agent").await.unwrap();
    let captured = adapter.capture_pane(&target, 10).await.unwrap();
    assert_eq!(captured, "hello agent");
}

#[tokio::test]
async fn send_escape_clears_copy_mode() {
    let adapter = FakeSessionAdapter::new();
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("acme", 0);
    adapter.set_copy_mode(&target, true);
    assert!(adapter.is_in_copy_mode(&target).await.unwrap());
    adapter.send_escape(&target).await.unwrap();
    assert!(!adapter.is_in_copy_mode(&target).await.unwrap());
}

#[tokio::test]
async fn kill_session_removes_it_from_list_sessions() {
    let adapter = FakeSessionAdapter::new();
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    assert!(adapter.session_exists("acme").await.unwrap());
    adapter.kill_session("acme", false).await.unwrap();
    assert!(!adapter.session_exists("acme").await.unwrap());
    assert!(adapter.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn session_created_at_reflects_the_fake_clock() {
    let adapter = FakeSessionAdapter::new();
    adapter.set_clock(1_700_000_000);
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    assert_eq!(adapter.session_created_at("acme").await.unwrap(), Some(1_700_000_000));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let adapter = FakeSessionAdapter::new();
    adapter.create_session("acme", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("acme", 0);
    adapter.send_literal(&target, "hi").await.unwrap();
    adapter.send_enter(&target).await.unwrap();
    let calls = adapter.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], SessionCall::CreateSession { .. }));
    assert!(matches!(calls[1], SessionCall::SendLiteral { .. }));
    assert!(matches!(calls[2], SessionCall::SendEnter { .. }));
}
