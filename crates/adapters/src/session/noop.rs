// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op session adapter for deployments with session management disabled.

use async_trait::async_trait;
use std::path::Path;

use super::{SessionAdapter, SessionError, SessionTarget};

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSessionAdapter;

impl NoOpSessionAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionAdapter for NoOpSessionAdapter {
    async fn create_session(&self, _name: &str, _cwd: &Path) -> Result<(), SessionError> {
        Ok(())
    }

    async fn new_window(&self, _session: &str, _window_name: &str, _cwd: &Path) -> Result<u32, SessionError> {
        Ok(0)
    }

    async fn kill_session(&self, _session: &str, _force: bool) -> Result<(), SessionError> {
        Ok(())
    }

    async fn capture_pane(&self, _target: &SessionTarget, _lines: u32) -> Result<String, SessionError> {
        Ok(String::new())
    }

    async fn window_exists(&self, _target: &SessionTarget) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn session_exists(&self, _session: &str) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        Ok(Vec::new())
    }

    async fn session_created_at(&self, _session: &str) -> Result<Option<i64>, SessionError> {
        Ok(None)
    }

    async fn send_literal(&self, _target: &SessionTarget, _text: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn send_enter(&self, _target: &SessionTarget) -> Result<(), SessionError> {
        Ok(())
    }

    async fn send_escape(&self, _target: &SessionTarget) -> Result<(), SessionError> {
        Ok(())
    }

    async fn send_ctrl_c(&self, _target: &SessionTarget) -> Result<(), SessionError> {
        Ok(())
    }

    async fn is_in_copy_mode(&self, _target: &SessionTarget) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn foreground_command(&self, _target: &SessionTarget) -> Result<Option<String>, SessionError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
