// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage: an event-sourced write-ahead log, a compressed
//! snapshot format, and the `MaterializedState` they reconstruct.

mod error;
mod snapshot;
mod state;
mod wal;

pub use error::StoreError;
pub use snapshot::{Snapshot, SnapshotError, SCHEMA_VERSION};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError, FLUSH_INTERVAL, FLUSH_THRESHOLD};

/// Opens the durable store rooted at `state_dir`: loads the latest
/// snapshot (if any), opens the WAL, and replays every entry with a
/// sequence number past the snapshot's `last_applied_seq`.
pub struct Store {
    pub state: MaterializedState,
    pub wal: Wal,
    snapshot_path: std::path::PathBuf,
}

impl Store {
    pub fn open(state_dir: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let state_dir = state_dir.as_ref();
        std::fs::create_dir_all(state_dir)?;
        let snapshot_path = Snapshot::default_path(state_dir);
        let wal_path = state_dir.join("wal.jsonl");

        let mut state = Snapshot::load(&snapshot_path)?.unwrap_or_default();
        let wal = match Wal::open(&wal_path) {
            Ok(wal) => wal,
            Err(WalError::Corrupt { .. }) => {
                Wal::rotate_corrupt(&wal_path)?;
                Wal::open(&wal_path)?
            }
            Err(other) => return Err(other.into()),
        };

        let already_applied = state.last_applied_seq;
        for entry in Wal::scan(&wal_path)? {
            if already_applied.map_or(true, |seq| entry.seq > seq) {
                state.apply_event(entry.seq, &entry.event);
            }
        }

        Ok(Self { state, wal, snapshot_path })
    }

    /// Appends and folds an event into state in one step — the common path
    /// for every write in the engine.
    pub fn append(&mut self, event: orc_core::event::Event) -> Result<(), StoreError> {
        let seq = self.wal.append(event.clone())?;
        self.state.apply_event(seq, &event);
        Ok(())
    }

    /// Durable checkpoint: flush the WAL, write the snapshot (fsync +
    /// atomic rename + directory fsync), then truncate the WAL. Crashing
    /// anywhere before the rename completes leaves the prior snapshot and
    /// full WAL intact; crashing after leaves the new snapshot and an
    /// empty WAL, which replays to the same state.
    pub fn checkpoint(&mut self) -> Result<(), StoreError> {
        self.wal.flush()?;
        Snapshot::checkpoint(&self.snapshot_path, &self.state)?;
        self.wal.truncate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
