// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, shutdown, and the singleton lock + heartbeat mechanism
//! spec.md §4.7 requires of the Scheduler Core: exactly one `orcd` process
//! may hold the durable store at a time, and a stale lock from a crashed
//! process must never be mistaken for a live daemon.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::Mutex;

use orc_storage::{Store, StoreError};

use crate::env;

/// A heartbeat file older than this is presumed to belong to a dead
/// process even if the lock file itself wasn't cleaned up (e.g. a `kill
/// -9`) — the CLI's liveness probe in `daemon_process` uses this bound
/// before deciding to auto-start a replacement.
pub const HEARTBEAT_STALE_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub heartbeat_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            heartbeat_path: state_dir.join("daemon.heartbeat"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            state_dir,
        })
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a state directory")]
    NoStateDir,
    #[error("failed to acquire the daemon lock: another orcd is already running")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the running daemon owns for its process lifetime.
pub struct DaemonState {
    pub paths: Paths,
    // Held only to keep the exclusive advisory lock alive; never read.
    #[allow(dead_code)]
    lock_file: File,
    pub store: Arc<Mutex<Store>>,
    pub start_time: Instant,
}

pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

/// Acquires the singleton lock, opens the durable store, and binds the
/// IPC socket — in that order, so a failure at any step leaves nothing
/// behind that would make a concurrently-starting daemon believe a peer
/// is already up when it isn't (spec.md §4.7's lock-protected singleton).
pub fn startup(paths: Paths) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&paths.state_dir)?;

    let lock_file = OpenOptions::new().write(true).create(true).truncate(false).open(&paths.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::write(&paths.version_path, env!("CARGO_PKG_VERSION"))?;

    let store = Store::open(&paths.state_dir)?;

    if paths.socket_path.exists() {
        std::fs::remove_file(&paths.socket_path)?;
    }
    let listener = UnixListener::bind(&paths.socket_path).map_err(|e| LifecycleError::BindFailed(paths.socket_path.clone(), e))?;

    Ok(StartupResult {
        daemon: DaemonState { paths, lock_file, store: Arc::new(Mutex::new(store)), start_time: Instant::now() },
        listener,
    })
}

impl DaemonState {
    /// Touches the heartbeat file's mtime — called once per engine-loop
    /// tick so a liveness probe (`daemon_process::probe`) can distinguish
    /// a busy daemon from a hung one without reaching through the socket.
    pub fn write_heartbeat(&self) -> std::io::Result<()> {
        std::fs::write(&self.paths.heartbeat_path, std::process::id().to_string())
    }

    /// Graceful shutdown: checkpoint the durable store, then remove every
    /// file a concurrently-starting daemon would otherwise mistake for a
    /// live peer. Sessions in tmux are left running — they survive daemon
    /// restarts by design, and the next startup's health sweep reconnects.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        {
            let mut store = self.store.lock().await;
            store.checkpoint()?;
        }
        if self.paths.socket_path.exists() {
            let _ = std::fs::remove_file(&self.paths.socket_path);
        }
        if self.paths.lock_path.exists() {
            let _ = std::fs::remove_file(&self.paths.lock_path);
        }
        if self.paths.heartbeat_path.exists() {
            let _ = std::fs::remove_file(&self.paths.heartbeat_path);
        }
        Ok(())
    }
}
