// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use orc_core::ids::ProjectId;
use orc_core::project::Plan;
use tempfile::tempdir;

use super::*;

fn enqueue_event(id: &str) -> orc_core::event::Event {
    orc_core::event::Event::ProjectEnqueued {
        project_id: ProjectId::new(id),
        spec_path: "/spec.md".into(),
        project_path: "/work".into(),
        plan: Plan::Max5,
        batch_id: "batch-1".into(),
        enqueued_at: 0,
    }
}

#[test]
fn append_then_reopen_replays_from_wal() {
    let dir = tempdir().unwrap();
    {
        let mut store = Store::open(dir.path()).unwrap();
        store.append(enqueue_event("proj-1")).unwrap();
    }
    let store = Store::open(dir.path()).unwrap();
    assert!(store.state.projects.contains_key(&ProjectId::new("proj-1")));
}

#[test]
fn checkpoint_then_reopen_reads_from_snapshot_with_empty_wal() {
    let dir = tempdir().unwrap();
    {
        let mut store = Store::open(dir.path()).unwrap();
        store.append(enqueue_event("proj-1")).unwrap();
        store.checkpoint().unwrap();
    }
    let store = Store::open(dir.path()).unwrap();
    assert!(store.state.projects.contains_key(&ProjectId::new("proj-1")));
    assert_eq!(Wal::scan(dir.path().join("wal.jsonl")).unwrap().len(), 0);
}

#[test]
fn events_after_a_checkpoint_still_replay() {
    let dir = tempdir().unwrap();
    {
        let mut store = Store::open(dir.path()).unwrap();
        store.append(enqueue_event("proj-1")).unwrap();
        store.checkpoint().unwrap();
        store.append(enqueue_event("proj-2")).unwrap();
    }
    let store = Store::open(dir.path()).unwrap();
    assert_eq!(store.state.projects.len(), 2);
}
