// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Carries a process exit code through an `anyhow` chain so `main` can map
//! a failure to one of spec.md §6's exit codes (2 usage, 3 precondition,
//! 4 operational, 5 timeout) instead of always exiting 1.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<crate::client::ClientError> for ExitError {
    fn from(e: crate::client::ClientError) -> Self {
        use crate::client::ClientError::*;
        match e {
            DaemonStartTimeout => ExitError::new(5, e.to_string()),
            NoStateDir => ExitError::new(3, e.to_string()),
            DaemonNotRunning | DaemonStartFailed(_) | Protocol(_) | Rejected(_) | UnexpectedResponse | Io(_) => {
                ExitError::new(4, e.to_string())
            }
        }
    }
}
