// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use orc_core::ids::ProjectId;
use orc_core::project::{Plan, Project};
use tempfile::tempdir;

use super::*;

#[test]
fn checkpoint_then_load_round_trips_state() {
    let dir = tempdir().unwrap();
    let path = Snapshot::default_path(dir.path());

    let mut state = MaterializedState::new();
    let project = Project::new(
        ProjectId::new("proj-1"),
        "/spec.md".into(),
        "/work".into(),
        Plan::Max5,
        "batch-1".into(),
        1000,
    );
    state.projects.insert(project.id.clone(), project);

    Snapshot::checkpoint(&path, &state).unwrap();
    let loaded = Snapshot::load(&path).unwrap().unwrap();

    assert_eq!(loaded.projects.len(), 1);
    assert!(loaded.projects.contains_key(&ProjectId::new("proj-1")));
}

#[test]
fn load_of_missing_path_is_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.zst");
    assert!(Snapshot::load(&path).unwrap().is_none());
}

#[test]
fn load_rejects_mismatched_schema_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.zst");
    let file = SnapshotFile {
        header: SnapshotHeader {
            schema_version: SCHEMA_VERSION + 1,
            last_applied_seq: None,
        },
        state: MaterializedState::new(),
    };
    let json = serde_json::to_vec(&file).unwrap();
    let compressed = zstd::encode_all(json.as_slice(), 0).unwrap();
    std::fs::write(&path, compressed).unwrap();

    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::SchemaMismatch { .. }));
}
