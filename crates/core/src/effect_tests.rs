// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;

#[test]
fn send_to_session_round_trips_through_json() {
    let effect = Effect::SendToSession {
        target: SessionName::new("spec-widget:0"),
        message: "status?".into(),
        task_id: Some(TaskId::new("task-1")),
    };
    let json = serde_json::to_string(&effect).unwrap();
    let back: Effect = serde_json::from_str(&json).unwrap();
    match back {
        Effect::SendToSession { target, .. } => assert_eq!(target, "spec-widget:0"),
        other => panic!("unexpected effect: {other:?}"),
    }
}

#[test]
fn create_workspace_carries_role_and_parent_dir() {
    let effect = Effect::CreateWorkspace {
        project_id: ProjectId::new("proj-1"),
        role: Role::new("developer"),
        parent_dir: PathBuf::from("/work"),
    };
    match effect {
        Effect::CreateWorkspace { parent_dir, .. } => assert_eq!(parent_dir, PathBuf::from("/work")),
        other => panic!("unexpected effect: {other:?}"),
    }
}
