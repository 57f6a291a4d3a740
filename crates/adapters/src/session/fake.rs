// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory session adapter for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{SessionAdapter, SessionError, SessionTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    CreateSession { name: String, cwd: PathBuf },
    NewWindow { session: String, window_name: String, cwd: PathBuf },
    KillSession { session: String, force: bool },
    CapturePane { target: SessionTarget, lines: u32 },
    SendLiteral { target: SessionTarget, text: String },
    SendEnter { target: SessionTarget },
    SendEscape { target: SessionTarget },
    SendCtrlC { target: SessionTarget },
}

#[derive(Debug, Clone, Default)]
struct FakeWindow {
    pane: Vec<String>,
    in_copy_mode: bool,
    foreground_command: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeSession {
    created_at: i64,
    windows: HashMap<u32, FakeWindow>,
    next_window: u32,
}

#[derive(Default)]
struct FakeSessionState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
    clock: i64,
}

#[derive(Clone, Default)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<FakeSessionState>>,
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_clock(&self, epoch_seconds: i64) {
        self.inner.lock().clock = epoch_seconds;
    }

    pub fn set_pane_content(&self, target: &SessionTarget, lines: Vec<String>) {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(&target.session) {
            session.windows.entry(target.window).or_default().pane = lines;
        }
    }

    pub fn set_copy_mode(&self, target: &SessionTarget, in_copy_mode: bool) {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(&target.session) {
            session.windows.entry(target.window).or_default().in_copy_mode = in_copy_mode;
        }
    }

    pub fn set_foreground_command(&self, target: &SessionTarget, command: Option<&str>) {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(&target.session) {
            session.windows.entry(target.window).or_default().foreground_command = command.map(str::to_string);
        }
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn create_session(&self, name: &str, _cwd: &Path) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::CreateSession { name: name.to_string(), cwd: _cwd.to_path_buf() });
        let created_at = inner.clock;
        inner.sessions.insert(
            name.to_string(),
            FakeSession { created_at, windows: HashMap::from([(0, FakeWindow::default())]), next_window: 1 },
        );
        Ok(())
    }

    async fn new_window(&self, session: &str, window_name: &str, cwd: &Path) -> Result<u32, SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::NewWindow {
            session: session.to_string(),
            window_name: window_name.to_string(),
            cwd: cwd.to_path_buf(),
        });
        let Some(s) = inner.sessions.get_mut(session) else {
            return Err(SessionError::SessionNotFound(session.to_string()));
        };
        let index = s.next_window;
        s.next_window += 1;
        s.windows.insert(index, FakeWindow::default());
        Ok(index)
    }

    async fn kill_session(&self, session: &str, force: bool) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::KillSession { session: session.to_string(), force });
        inner.sessions.remove(session);
        Ok(())
    }

    async fn capture_pane(&self, target: &SessionTarget, lines: u32) -> Result<String, SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::CapturePane { target: target.clone(), lines });
        let window = inner
            .sessions
            .get(&target.session)
            .and_then(|s| s.windows.get(&target.window))
            .ok_or_else(|| SessionError::WindowNotFound(target.tmux_target()))?;
        let start = window.pane.len().saturating_sub(lines as usize);
        Ok(window.pane[start..].join("\n"))
    }

    async fn window_exists(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .get(&target.session)
            .is_some_and(|s| s.windows.contains_key(&target.window)))
    }

    async fn session_exists(&self, session: &str) -> Result<bool, SessionError> {
        Ok(self.inner.lock().sessions.contains_key(session))
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.inner.lock().sessions.keys().cloned().collect())
    }

    async fn session_created_at(&self, session: &str) -> Result<Option<i64>, SessionError> {
        Ok(self.inner.lock().sessions.get(session).map(|s| s.created_at))
    }

    async fn send_literal(&self, target: &SessionTarget, text: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::SendLiteral { target: target.clone(), text: text.to_string() });
        let window = inner
            .sessions
            .get_mut(&target.session)
            .and_then(|s| s.windows.get_mut(&target.window))
            .ok_or_else(|| SessionError::WindowNotFound(target.tmux_target()))?;
        window.pane.push(text.to_string());
        Ok(())
    }

    async fn send_enter(&self, target: &SessionTarget) -> Result<(), SessionError> {
        self.inner.lock().calls.push(SessionCall::SendEnter { target: target.clone() });
        Ok(())
    }

    async fn send_escape(&self, target: &SessionTarget) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::SendEscape { target: target.clone() });
        if let Some(window) = inner.sessions.get_mut(&target.session).and_then(|s| s.windows.get_mut(&target.window)) {
            window.in_copy_mode = false;
        }
        Ok(())
    }

    async fn send_ctrl_c(&self, target: &SessionTarget) -> Result<(), SessionError> {
        self.inner.lock().calls.push(SessionCall::SendCtrlC { target: target.clone() });
        Ok(())
    }

    async fn is_in_copy_mode(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .get(&target.session)
            .and_then(|s| s.windows.get(&target.window))
            .map(|w| w.in_copy_mode)
            .unwrap_or(false))
    }

    async fn foreground_command(&self, target: &SessionTarget) -> Result<Option<String>, SessionError> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .get(&target.session)
            .and_then(|s| s.windows.get(&target.window))
            .and_then(|w| w.foreground_command.clone()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
