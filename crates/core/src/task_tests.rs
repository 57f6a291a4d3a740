// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn task() -> ScheduledTask {
    ScheduledTask::new_recurring(
        TaskId::new("task-1"),
        SessionName::new("spec-widget:0"),
        "status check".into(),
        "dedup-1".into(),
        30,
        1000,
        0,
    )
}

#[test]
fn is_due_respects_status_and_time() {
    let t = task();
    assert!(!t.is_due(999));
    assert!(t.is_due(1000));
    assert!(t.is_due(5000));
}

#[test]
fn backoff_doubles_and_caps_at_eight_minutes() {
    assert_eq!(ScheduledTask::backoff_minutes(1), 2);
    assert_eq!(ScheduledTask::backoff_minutes(2), 4);
    assert_eq!(ScheduledTask::backoff_minutes(3), 8);
    assert_eq!(ScheduledTask::backoff_minutes(10), 8);
}

#[test]
fn delivery_failure_reschedules_with_backoff() {
    let mut t = task();
    t.record_delivery_failure(1000);
    assert_eq!(t.dispatch_count, 1);
    assert_eq!(t.status, TaskStatus::Pending);
    assert_eq!(t.next_run_epoch, 1000 + 2 * 60);
}

#[test]
fn delivery_failure_past_ceiling_marks_unreachable() {
    let mut t = task();
    t.dispatch_count = MAX_DISPATCH_ATTEMPTS;
    t.record_delivery_failure(1000);
    assert_eq!(t.status, TaskStatus::AgentUnreachable);
}

#[test]
fn delivery_success_reschedules_recurring_and_resets_count() {
    let mut t = task();
    t.dispatch_count = 2;
    t.record_delivery_success(1000);
    assert_eq!(t.dispatch_count, 0);
    assert_eq!(t.status, TaskStatus::Pending);
    assert_eq!(t.next_run_epoch, 1000 + 30 * 60);
}

#[test]
fn delivery_success_completes_one_shot() {
    let mut t = ScheduledTask::new_one_shot(
        TaskId::new("task-2"),
        SessionName::new("spec-widget:0"),
        "one time".into(),
        "dedup-2".into(),
        500,
        0,
    );
    t.record_delivery_success(500);
    assert_eq!(t.status, TaskStatus::Done);
}
