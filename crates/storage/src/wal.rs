// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable, append-only write-ahead log of [`Event`]s.
//!
//! Entries are buffered in memory and flushed to disk as a group: every
//! [`FLUSH_INTERVAL`] or after [`FLUSH_THRESHOLD`] buffered entries,
//! whichever comes first. This keeps `fsync` cost amortized across many
//! writers without ever losing more than one flush interval of events on a
//! crash.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use orc_core::event::Event;
use thiserror::Error;

/// Group-commit flush cadence.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(10);
/// Group-commit flush threshold, in buffered entries.
pub const FLUSH_THRESHOLD: usize = 100;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt WAL entry at offset {offset}: {source}")]
    Corrupt {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// A single WAL record: a monotonic sequence number, the event, and whether
/// it has been folded into a durable snapshot yet.
#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// An append-only log backed by a single file, one JSON object per line.
pub struct Wal {
    path: PathBuf,
    file: File,
    next_seq: u64,
    buffered: Vec<WalEntry>,
}

impl Wal {
    /// Opens (creating if absent) the WAL at `path` and scans it for the
    /// next sequence number. Does not replay entries into any state; callers
    /// combine [`Wal::scan`] with a snapshot to reconstruct state.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let next_seq = Self::scan(&path)?
            .last()
            .map(|e| e.seq + 1)
            .unwrap_or(0);
        Ok(Self {
            path,
            file,
            next_seq,
            buffered: Vec::new(),
        })
    }

    /// Reads every well-formed entry currently on disk. A trailing
    /// partially-written line (the tail of an unflushed append, e.g. after a
    /// crash mid-write) is skipped rather than treated as corruption; any
    /// malformed line elsewhere in the file is a hard [`WalError::Corrupt`]
    /// the caller should rotate to a `.bak` file and start fresh.
    pub fn scan(path: impl AsRef<Path>) -> Result<Vec<WalEntry>, WalError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut offset = 0u64;
        loop {
            let mut line = String::new();
            let start = offset;
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            offset += read as u64;
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredEntry>(trimmed) {
                Ok(stored) => entries.push(WalEntry {
                    seq: stored.seq,
                    event: stored.event,
                }),
                Err(source) => {
                    // A truncated final line (no trailing newline observed
                    // and we're at EOF) is the expected shape of a crash
                    // mid-append; anything earlier in the file is real
                    // corruption.
                    if offset == len {
                        break;
                    }
                    return Err(WalError::Corrupt { offset: start, source });
                }
            }
        }
        Ok(entries)
    }

    /// Appends an event to the in-memory buffer, flushing immediately if the
    /// buffer has reached [`FLUSH_THRESHOLD`].
    pub fn append(&mut self, event: Event) -> Result<u64, WalError> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.buffered.push(WalEntry { seq, event });
        if self.buffered.len() >= FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(seq)
    }

    pub fn pending(&self) -> usize {
        self.buffered.len()
    }

    /// Writes every buffered entry to disk and fsyncs. Safe to call with an
    /// empty buffer.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.buffered.is_empty() {
            return Ok(());
        }
        for entry in &self.buffered {
            let stored = StoredEntry {
                seq: entry.seq,
                event: entry.event.clone(),
            };
            let line = serde_json::to_string(&stored).map_err(|e| WalError::Corrupt {
                offset: 0,
                source: e,
            })?;
            writeln!(self.file, "{line}")?;
        }
        self.file.sync_data()?;
        self.buffered.clear();
        Ok(())
    }

    /// Truncates the WAL to empty. Only safe to call once a snapshot durably
    /// covers every entry being discarded — callers must flush, fsync the
    /// snapshot, atomically rename it into place, and fsync the containing
    /// directory before calling this.
    pub fn truncate(&mut self) -> Result<(), WalError> {
        self.flush()?;
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.next_seq = 0;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotates a WAL suspected of corruption out of the way so the daemon
    /// can start from the last good snapshot instead of refusing to boot.
    pub fn rotate_corrupt(path: impl AsRef<Path>) -> Result<PathBuf, WalError> {
        let path = path.as_ref();
        let backup = path.with_extension("bak");
        std::fs::rename(path, &backup)?;
        Ok(backup)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StoredEntry {
    seq: u64,
    event: Event,
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
