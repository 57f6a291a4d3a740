// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wal error: {0}")]
    Wal(#[from] crate::wal::WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
    #[error("entity not found: {0}")]
    NotFound(String),
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
    #[error("another project is already PROCESSING")]
    AlreadyProcessing,
    #[error("snapshot schema version {found} is incompatible with {expected}")]
    SchemaMismatch { found: u32, expected: u32 },
    #[error("lock held by another process")]
    Locked,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
