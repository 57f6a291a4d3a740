// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn serde_tag_matches_kind() {
    let event = Event::ProjectAttemptIncremented {
        project_id: ProjectId::new("proj-1"),
        attempts: 2,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "project:attempt_incremented");
    assert_eq!(event.kind(), "project:attempt_incremented");
}

#[test]
fn round_trips_through_json() {
    let event = Event::TaskDeliveryFailed {
        task_id: TaskId::new("task-1"),
        at: 1000,
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back.kind(), event.kind());
}
