// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the safe-run subprocess wrapper.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{description} failed to spawn: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {timeout_secs}s and was killed")]
    Timeout { description: String, timeout_secs: u64 },
    #[error("{description} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        description: String,
        code: Option<i32>,
        stderr: String,
    },
}
