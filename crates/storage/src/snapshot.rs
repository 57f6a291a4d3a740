// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compressed, atomically-replaced snapshots of [`MaterializedState`].
//!
//! A checkpoint is durable only once every one of these has happened, in
//! order: the snapshot bytes are written to a temp file and fsynced, the
//! temp file is renamed over the live snapshot path (atomic on the same
//! filesystem), and the containing directory is fsynced so the rename
//! itself survives a crash. Only after all three does the WAL get
//! truncated — truncating first would lose events on a crash between the
//! snapshot write and its fsync.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::MaterializedState;

/// Bumped whenever `MaterializedState`'s on-disk shape changes in a way
/// that isn't forward-compatible. `Snapshot::load` refuses to start on a
/// version it doesn't recognize rather than guess at a migration.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("(de)serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("zstd error: {0}")]
    Zstd(std::io::Error),
    #[error("snapshot schema version {found} is incompatible with {expected}")]
    SchemaMismatch { found: u32, expected: u32 },
}

#[derive(Serialize, Deserialize)]
struct SnapshotHeader {
    schema_version: u32,
    last_applied_seq: Option<u64>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    header: SnapshotHeader,
    state: MaterializedState,
}

pub struct Snapshot;

impl Snapshot {
    /// Writes `state` to `path` via a `.tmp` sibling, fsync, atomic rename,
    /// and directory fsync, in that order.
    pub fn checkpoint(path: impl AsRef<Path>, state: &MaterializedState) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");

        let file = SnapshotFile {
            header: SnapshotHeader {
                schema_version: SCHEMA_VERSION,
                last_applied_seq: state.last_applied_seq,
            },
            state: state.clone(),
        };
        let json = serde_json::to_vec(&file)?;
        let compressed = zstd::encode_all(json.as_slice(), 0).map_err(SnapshotError::Zstd)?;

        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&compressed)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    /// Loads a snapshot if present, re-indexing transient fields that
    /// aren't persisted. Returns `Ok(None)` for a cold start with no prior
    /// snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<MaterializedState>, SnapshotError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let compressed = fs::read(path)?;
        let json = zstd::decode_all(compressed.as_slice()).map_err(SnapshotError::Zstd)?;
        let file: SnapshotFile = serde_json::from_slice(&json)?;
        if file.header.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::SchemaMismatch {
                found: file.header.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let mut state = file.state;
        state.reindex();
        Ok(Some(state))
    }

    pub fn default_path(state_dir: impl AsRef<Path>) -> PathBuf {
        state_dir.as_ref().join("snapshot.zst")
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
