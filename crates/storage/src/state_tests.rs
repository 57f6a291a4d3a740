// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use orc_core::authorization::Priority;
use orc_core::ids::{AuthorizationId, ProjectId, Role, SessionName, TaskId};
use orc_core::project::{Plan, ProjectStatus};

use super::*;

fn enqueue(state: &mut MaterializedState, seq: u64, id: &str) {
    state.apply_event(
        seq,
        &Event::ProjectEnqueued {
            project_id: ProjectId::new(id),
            spec_path: "/spec.md".into(),
            project_path: "/work".into(),
            plan: Plan::Max5,
            batch_id: "batch-1".into(),
            enqueued_at: 0,
        },
    );
}

#[test]
fn applying_the_same_seq_twice_is_a_no_op() {
    let mut state = MaterializedState::new();
    enqueue(&mut state, 0, "proj-1");
    enqueue(&mut state, 0, "proj-1");
    assert_eq!(state.projects.len(), 1);
}

#[test]
fn project_status_changed_to_processing_sets_singleton_slot() {
    let mut state = MaterializedState::new();
    enqueue(&mut state, 0, "proj-1");
    state.apply_event(
        1,
        &Event::ProjectStatusChanged {
            project_id: ProjectId::new("proj-1"),
            from: ProjectStatus::Queued,
            to: ProjectStatus::Processing,
            at: 10,
            error_message: None,
            failed_components: vec![],
        },
    );
    assert_eq!(state.processing_project(), Some(&ProjectId::new("proj-1")));
}

#[test]
fn transition_project_rejects_illegal_moves() {
    let mut state = MaterializedState::new();
    enqueue(&mut state, 0, "proj-1");
    let err = state
        .transition_project(&ProjectId::new("proj-1"), ProjectStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, StoreError::IllegalTransition { .. }));
}

#[test]
fn transition_project_rejects_second_concurrent_processing() {
    let mut state = MaterializedState::new();
    enqueue(&mut state, 0, "proj-1");
    enqueue(&mut state, 1, "proj-2");
    state.apply_event(
        2,
        &Event::ProjectStatusChanged {
            project_id: ProjectId::new("proj-1"),
            from: ProjectStatus::Queued,
            to: ProjectStatus::Processing,
            at: 10,
            error_message: None,
            failed_components: vec![],
        },
    );
    let err = state
        .transition_project(&ProjectId::new("proj-2"), ProjectStatus::Processing)
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyProcessing));
}

#[test]
fn task_upsert_is_idempotent_by_dedup_key() {
    let mut state = MaterializedState::new();
    let upsert = |seq, id: &str| Event::TaskUpserted {
        task_id: TaskId::new(id),
        target: SessionName::new("spec-widget:0"),
        message: "status?".into(),
        dedup_key: "dedup-1".into(),
        interval_minutes: Some(30),
        next_run_epoch: 100,
        created_at: 0,
    };
    state.apply_event(0, &upsert(0, "task-1"));
    state.apply_event(1, &upsert(1, "task-2"));

    assert_eq!(state.tasks.len(), 1);
    assert!(state.tasks.contains_key(&TaskId::new("task-1")));
}

#[test]
fn due_tasks_returns_only_pending_tasks_at_or_before_now() {
    let mut state = MaterializedState::new();
    state.apply_event(
        0,
        &Event::TaskUpserted {
            task_id: TaskId::new("task-1"),
            target: SessionName::new("spec-widget:0"),
            message: "m".into(),
            dedup_key: "d1".into(),
            interval_minutes: None,
            next_run_epoch: 100,
            created_at: 0,
        },
    );
    state.apply_event(
        1,
        &Event::TaskUpserted {
            task_id: TaskId::new("task-2"),
            target: SessionName::new("spec-widget:0"),
            message: "m".into(),
            dedup_key: "d2".into(),
            interval_minutes: None,
            next_run_epoch: 500,
            created_at: 0,
        },
    );

    let due = state.due_tasks(200);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, TaskId::new("task-1"));
}

#[test]
fn task_claimed_removes_from_due_index() {
    let mut state = MaterializedState::new();
    state.apply_event(
        0,
        &Event::TaskUpserted {
            task_id: TaskId::new("task-1"),
            target: SessionName::new("spec-widget:0"),
            message: "m".into(),
            dedup_key: "d1".into(),
            interval_minutes: None,
            next_run_epoch: 100,
            created_at: 0,
        },
    );
    state.apply_event(1, &Event::TaskClaimed { task_ids: vec![TaskId::new("task-1")], at: 200 });
    assert!(state.due_tasks(200).is_empty());
}

#[test]
fn delivery_success_deletes_a_one_shot_task() {
    let mut state = MaterializedState::new();
    state.apply_event(
        0,
        &Event::TaskUpserted {
            task_id: TaskId::new("task-1"),
            target: SessionName::new("spec-widget:0"),
            message: "m".into(),
            dedup_key: "d1".into(),
            interval_minutes: None,
            next_run_epoch: 100,
            created_at: 0,
        },
    );
    state.apply_event(1, &Event::TaskClaimed { task_ids: vec![TaskId::new("task-1")], at: 100 });
    state.apply_event(2, &Event::TaskDeliverySucceeded { task_id: TaskId::new("task-1"), at: 100 });

    assert!(!state.tasks.contains_key(&TaskId::new("task-1")));
    assert!(state.existing_task_for_dedup_key("d1").is_none());
}

#[test]
fn delivery_success_reschedules_a_recurring_task_instead_of_deleting_it() {
    let mut state = MaterializedState::new();
    state.apply_event(
        0,
        &Event::TaskUpserted {
            task_id: TaskId::new("task-1"),
            target: SessionName::new("spec-widget:0"),
            message: "m".into(),
            dedup_key: "d1".into(),
            interval_minutes: Some(15),
            next_run_epoch: 100,
            created_at: 0,
        },
    );
    state.apply_event(1, &Event::TaskClaimed { task_ids: vec![TaskId::new("task-1")], at: 100 });
    state.apply_event(2, &Event::TaskDeliverySucceeded { task_id: TaskId::new("task-1"), at: 100 });

    let task = state.tasks.get(&TaskId::new("task-1")).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.next_run_epoch, 100 + 15 * 60);
}

#[test]
fn authorization_requested_then_resolved() {
    let mut state = MaterializedState::new();
    state.apply_event(
        0,
        &Event::AuthorizationRequested {
            authorization_id: AuthorizationId::new("auth-1"),
            session_name: SessionName::new("acme-impl-ab12cd"),
            request_id: "req-1".to_string(),
            project_id: ProjectId::new("proj-1"),
            from_role: Role::new("developer"),
            to_role: Role::new("orchestrator"),
            priority: Priority::P1,
            action: "ok?".into(),
            requested_at: 0,
        },
    );
    state.apply_event(
        1,
        &Event::AuthorizationResolved {
            authorization_id: AuthorizationId::new("auth-1"),
            outcome: orc_core::authorization::AuthorizationOutcome::Approved,
            resolution: Some("go ahead".to_string()),
            at: 10,
        },
    );
    let auth = state.authorizations.get(&AuthorizationId::new("auth-1")).unwrap();
    assert_eq!(auth.status, orc_core::authorization::AuthorizationOutcome::Approved);
    assert_eq!(auth.resolution, Some("go ahead".to_string()));
}
