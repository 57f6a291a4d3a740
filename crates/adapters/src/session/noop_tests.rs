// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::*;

#[tokio::test]
async fn every_operation_succeeds_without_a_tmux_server() {
    let adapter = NoOpSessionAdapter::new();
    adapter.create_session("x", Path::new("/tmp")).await.unwrap();
    assert_eq!(adapter.new_window("x", "dev", Path::new("/tmp")).await.unwrap(), 0);
    let target = SessionTarget::new("x", 0);
    assert_eq!(adapter.capture_pane(&target, 10).await.unwrap(), "");
    assert!(!adapter.window_exists(&target).await.unwrap());
    assert!(!adapter.session_exists("x").await.unwrap());
    assert!(adapter.list_sessions().await.unwrap().is_empty());
    assert_eq!(adapter.session_created_at("x").await.unwrap(), None);
    adapter.send_literal(&target, "hi").await.unwrap();
    adapter.send_enter(&target).await.unwrap();
    adapter.send_escape(&target).await.unwrap();
    adapter.send_ctrl_c(&target).await.unwrap();
    assert!(!adapter.is_in_copy_mode(&target).await.unwrap());
    assert_eq!(adapter.foreground_command(&target).await.unwrap(), None);
    adapter.kill_session("x", true).await.unwrap();
}
