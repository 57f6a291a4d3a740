// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting, probing, and stopping the `orcd` process from the `orc` CLI.
//! The daemon itself never auto-starts another daemon — only the CLI does,
//! and only for action commands (spec.md §1: the CLI front-end is external
//! to the core, but this thin sliver of "make sure the core is running" is
//! the one piece of daemon lifecycle the CLI owns).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use crate::client::ClientError;
use crate::env;

pub fn daemon_dir() -> Result<PathBuf, ClientError> {
    env::state_dir().ok_or(ClientError::NoStateDir)
}

pub fn daemon_socket() -> Result<PathBuf, ClientError> {
    Ok(daemon_dir()?.join("daemon.sock"))
}

fn find_orcd_binary() -> PathBuf {
    if let Some(path) = env::daemon_binary() {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("orcd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("orcd")
}

/// Spawn `orcd` detached, writing nothing to this process's stdio.
pub fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let orcd_path = find_orcd_binary();
    Command::new(&orcd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// True if something is listening on the daemon's Unix socket.
pub fn probe_socket(socket_path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

fn read_daemon_pid() -> Result<Option<u32>, ClientError> {
    let pid_path = daemon_dir()?.join("daemon.pid");
    match std::fs::read_to_string(&pid_path) {
        Ok(content) => Ok(content.trim().parse::<u32>().ok()),
        Err(_) => Ok(None),
    }
}

fn process_exists(pid: u32) -> bool {
    Command::new("kill").args(["-0", &pid.to_string()]).stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null()).status().map(|s| s.success()).unwrap_or(false)
}

/// Remove a stale socket/pid pair left behind by a process that is no
/// longer running, so a fresh `orcd` can bind the socket.
pub fn cleanup_stale_socket() -> Result<(), ClientError> {
    let dir = daemon_dir()?;
    let socket_path = dir.join("daemon.sock");
    let pid_path = dir.join("daemon.pid");

    let pid_live = read_daemon_pid()?.is_some_and(process_exists);
    if !pid_live {
        let _ = std::fs::remove_file(&socket_path);
        let _ = std::fs::remove_file(&pid_path);
    }
    Ok(())
}

/// Read any `ERROR` lines the daemon logged since its last startup marker,
/// for a more useful message than "connection timed out".
pub fn read_startup_error() -> Option<String> {
    let log_path = daemon_dir().ok()?.join("daemon.log");
    let content = std::fs::read_to_string(&log_path).ok()?;
    let errors: Vec<&str> = content.lines().rev().take(20).filter(|l| l.contains("ERROR")).collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.into_iter().rev().collect::<Vec<_>>().join("\n"))
    }
}

pub fn connect_with_retry(timeout: Duration, mut child: std::process::Child, socket_path: &Path) -> Result<(), ClientError> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if let Ok(Some(status)) = child.try_wait() {
            return Err(ClientError::DaemonStartFailed(read_startup_error().unwrap_or_else(|| format!("orcd exited with {status}"))));
        }
        if probe_socket(socket_path) {
            return Ok(());
        }
        std::thread::sleep(env::connect_poll_interval());
    }
    Err(ClientError::DaemonStartTimeout)
}
