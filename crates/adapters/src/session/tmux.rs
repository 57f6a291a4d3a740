// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real tmux-backed `SessionAdapter`, driving `tokio::process::Command`
//! invocations of the `tmux` binary exactly as spec.md §4.3 requires: every
//! new window gets an explicit `-c <cwd>`, never inheriting the server's
//! working directory.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{SessionAdapter, SessionError, SessionTarget};

/// Grace period between SIGTERM and SIGKILL on a forced session kill.
const KILL_GRACE: Duration = Duration::from_millis(500);

#[derive(Clone, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn run(args: &[&str]) -> Result<std::process::Output, SessionError> {
        Command::new("tmux")
            .args(args)
            .output()
            .await
            .map_err(|e| SessionError::CommandFailed(e.to_string()))
    }
}

#[async_trait]
impl SessionAdapter for TmuxAdapter {
    async fn create_session(&self, name: &str, cwd: &Path) -> Result<(), SessionError> {
        if !cwd.exists() {
            return Err(SessionError::SpawnFailed(format!("working directory does not exist: {}", cwd.display())));
        }
        let cwd_str = cwd.to_string_lossy();
        let output = Self::run(&["new-session", "-d", "-s", name, "-c", &cwd_str]).await?;
        if !output.status.success() {
            return Err(SessionError::SpawnFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(())
    }

    async fn new_window(&self, session: &str, window_name: &str, cwd: &Path) -> Result<u32, SessionError> {
        if !cwd.exists() {
            return Err(SessionError::SpawnFailed(format!("working directory does not exist: {}", cwd.display())));
        }
        let cwd_str = cwd.to_string_lossy();
        let target = format!("{session}:");
        let output = Self::run(&["new-window", "-d", "-t", &target, "-n", window_name, "-c", &cwd_str, "-P", "-F", "#{window_index}"]).await?;
        if !output.status.success() {
            return Err(SessionError::SpawnFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<u32>()
            .map_err(|e| SessionError::CommandFailed(format!("unparsable window index: {e}")))
    }

    async fn kill_session(&self, session: &str, force: bool) -> Result<(), SessionError> {
        if force {
            let _ = Self::run(&["send-keys", "-t", session, "C-c"]).await;
            tokio::time::sleep(KILL_GRACE).await;
        }
        let _ = Self::run(&["kill-session", "-t", session]).await;
        Ok(())
    }

    async fn capture_pane(&self, target: &SessionTarget, lines: u32) -> Result<String, SessionError> {
        let t = target.tmux_target();
        let scrollback = format!("-{lines}");
        let output = Self::run(&["capture-pane", "-t", &t, "-p", "-S", &scrollback]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn window_exists(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["list-windows", "-t", &target.session, "-F", "#{window_index}"]).await?;
        if !output.status.success() {
            return Ok(false);
        }
        let _ = &t;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|l| l.trim() == target.window.to_string()))
    }

    async fn session_exists(&self, session: &str) -> Result<bool, SessionError> {
        let output = Self::run(&["has-session", "-t", session]).await?;
        Ok(output.status.success())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        let output = Self::run(&["list-sessions", "-F", "#{session_name}"]).await?;
        if !output.status.success() {
            // No server running at all is not an error — just no sessions.
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    async fn session_created_at(&self, session: &str) -> Result<Option<i64>, SessionError> {
        let output = Self::run(&["display-message", "-t", session, "-p", "#{session_created}"]).await?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().parse::<i64>().ok())
    }

    async fn send_literal(&self, target: &SessionTarget, text: &str) -> Result<(), SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["send-keys", "-t", &t, "-l", "--", text]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(())
    }

    async fn send_enter(&self, target: &SessionTarget) -> Result<(), SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["send-keys", "-t", &t, "Enter"]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(())
    }

    async fn send_escape(&self, target: &SessionTarget) -> Result<(), SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["send-keys", "-t", &t, "Escape"]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(())
    }

    async fn send_ctrl_c(&self, target: &SessionTarget) -> Result<(), SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["send-keys", "-t", &t, "C-c"]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(())
    }

    async fn is_in_copy_mode(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["display-message", "-t", &t, "-p", "#{pane_in_mode}"]).await?;
        if !output.status.success() {
            return Err(SessionError::WindowNotFound(t));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "1")
    }

    async fn foreground_command(&self, target: &SessionTarget) -> Result<Option<String>, SessionError> {
        let t = target.tmux_target();
        let output = Self::run(&["display-message", "-t", &t, "-p", "#{pane_current_command}"]).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let cmd = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if cmd.is_empty() { None } else { Some(cmd) })
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
