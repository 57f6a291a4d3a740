// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: `ORC_STATE_DIR` > `XDG_STATE_HOME/orc` >
/// `~/.local/state/orc`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ORC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = dirs::state_dir() {
        return Ok(xdg.join("orc"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/orc"))
}

/// Interval between engine-loop ticks (`ORC_TICK_MS`, default 1000ms).
pub fn tick_interval_ms() -> Option<std::time::Duration> {
    std::env::var("ORC_TICK_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(std::time::Duration::from_millis)
}
