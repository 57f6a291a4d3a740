// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate. Every
//! ad-hoc `std::env::var` call the CLI needs lives here, once, rather
//! than scattered through `client`/`daemon_process` (spec.md §9).

use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: `ORC_STATE_DIR` > `XDG_STATE_HOME/orc` >
/// `~/.local/state/orc`. Mirrors `orc_daemon::env::state_dir` exactly —
/// the CLI and daemon must agree on this path without linking crates.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ORC_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = dirs::state_dir() {
        return Some(xdg.join("orc"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/orc"))
}

/// Override for the `orcd` binary path, mainly used by tests so they don't
/// depend on `PATH` or a co-located release build.
pub fn daemon_binary() -> Option<String> {
    std::env::var("ORC_DAEMON_BINARY").ok()
}

fn duration_ms(var: &str, default_ms: u64) -> Duration {
    std::env::var(var).ok().and_then(|v| v.parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(Duration::from_millis(default_ms))
}

/// Timeout for a single request/response round trip over the IPC socket.
pub fn timeout_ipc() -> Duration {
    duration_ms("ORC_TIMEOUT_IPC_MS", 5_000)
}

/// Timeout for the daemon to come up and start accepting connections.
pub fn timeout_connect() -> Duration {
    duration_ms("ORC_TIMEOUT_CONNECT_MS", 5_000)
}

/// Polling interval while waiting for the daemon socket to appear.
pub fn connect_poll_interval() -> Duration {
    duration_ms("ORC_CONNECT_POLL_MS", 50)
}
