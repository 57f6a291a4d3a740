// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The safe-run wrapper: bounded timeout, guaranteed kill-on-timeout, and a
//! structured result every `git`/`tmux` invocation in this workspace goes
//! through (`orc-adapters`' `TmuxAdapter`, `GitAdapter`, and `orc-engine`'s
//! Auto-Merge Runner).

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use crate::error::ShellError;

/// Captured stdout/stderr of a completed subprocess, already validated as
/// a clean exit by [`safe_run`].
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// How many times to retry a failing invocation before giving up, and how
/// long to wait between attempts. `max_attempts = 1` means "no retry".
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy { max_attempts: 1, backoff: Duration::ZERO };

    pub fn capped_backoff(max_attempts: u32, initial: Duration, cap: Duration) -> Vec<Duration> {
        let mut out = Vec::with_capacity(max_attempts as usize);
        let mut cur = initial;
        for _ in 0..max_attempts {
            out.push(cur.min(cap));
            cur = (cur * 2).min(cap);
        }
        out
    }
}

/// Runs a subprocess with a hard wall-clock timeout. On timeout the child's
/// process tree is killed (`kill_on_drop` plus an explicit `kill().await`)
/// rather than left to leak, and the timeout is surfaced as
/// [`ShellError::Timeout`] rather than a generic I/O error.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ShellError> {
    cmd.kill_on_drop(true);
    let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
        description: description.to_string(),
        source,
    })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ShellError::Spawn { description: description.to_string(), source }),
        Err(_elapsed) => Err(ShellError::Timeout {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// The full safe-run contract: timeout, kill-on-overrun, a structured
/// `NonZeroExit` error on failure (so callers never have to inspect a raw
/// `ExitStatus` themselves), and an optional bounded retry for transient
/// infrastructure failures (spec.md §7's "Transient infrastructure" class —
/// `git` lock contention, a `tmux` server still starting up).
pub async fn safe_run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
    retry: RetryPolicy,
    description: &str,
) -> Result<CommandOutput, ShellError> {
    let backoffs = RetryPolicy::capped_backoff(retry.max_attempts, retry.backoff, retry.backoff * 8);
    let mut last_err = None;

    for (attempt, backoff) in backoffs.iter().enumerate() {
        if attempt > 0 {
            tracing::warn!(program, attempt, "retrying subprocess after failure");
            tokio::time::sleep(*backoff).await;
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        match run_with_timeout(cmd, timeout, description).await {
            Ok(output) if output.status.success() => {
                return Ok(CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                tracing::error!(program, code = ?output.status.code(), %stderr, "subprocess exited non-zero");
                last_err = Some(ShellError::NonZeroExit {
                    description: description.to_string(),
                    code: output.status.code(),
                    stderr,
                });
            }
            Err(err) => {
                tracing::error!(program, error = %err, "subprocess failed");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or(ShellError::NonZeroExit {
        description: description.to_string(),
        code: None,
        stderr: String::new(),
    }))
}
