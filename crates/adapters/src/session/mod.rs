// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Controller adapters (spec.md §4.3): create/attach/kill tmux
//! sessions and windows with an explicit working directory, capture pane
//! output, and answer liveness questions. The Tmux Messenger (C2, in
//! `orc-engine`) is built on top of this trait's literal-send/verify
//! primitives rather than duplicating tmux invocations of its own.

mod noop;
mod tmux;

pub use noop::NoOpSessionAdapter;
pub use tmux::TmuxAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// A `session:window` pair — the addressing scheme spec.md §4.2 and §4.3
/// use throughout (a pane suffix is accepted on parse but not modeled
/// separately since every target in this system is window-granular).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTarget {
    pub session: String,
    pub window: u32,
}

impl SessionTarget {
    pub fn new(session: impl Into<String>, window: u32) -> Self {
        Self { session: session.into(), window }
    }

    /// Renders as the `session:window` string tmux itself expects.
    pub fn tmux_target(&self) -> String {
        format!("{}:{}", self.session, self.window)
    }
}

impl std::fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tmux_target())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("window not found: {0}")]
    WindowNotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for the tmux session/window surface (spec.md §4.3).
#[async_trait]
pub trait SessionAdapter: Clone + Send + Sync + 'static {
    /// Creates a new session with one window (index 0), cwd always
    /// explicit — a new window never inherits the tmux server's cwd.
    async fn create_session(&self, name: &str, cwd: &Path) -> Result<(), SessionError>;

    /// Creates an additional window in an existing session, returning its
    /// index.
    async fn new_window(&self, session: &str, window_name: &str, cwd: &Path) -> Result<u32, SessionError>;

    /// Kills a session. `force = true` sends SIGTERM, waits briefly, then
    /// SIGKILLs the pane's process tree if it is still alive.
    async fn kill_session(&self, session: &str, force: bool) -> Result<(), SessionError>;

    async fn capture_pane(&self, target: &SessionTarget, lines: u32) -> Result<String, SessionError>;

    async fn window_exists(&self, target: &SessionTarget) -> Result<bool, SessionError>;

    async fn session_exists(&self, session: &str) -> Result<bool, SessionError>;

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError>;

    /// Returns the epoch-seconds the named session was created, if it
    /// exists — used by the Health Monitor's phantom-rediscovery candidate
    /// age bound (spec.md §4.9).
    async fn session_created_at(&self, session: &str) -> Result<Option<i64>, SessionError>;

    /// Sends literal text with no key-name interpretation (`tmux send-keys
    /// -l --`), the first half of the Tmux Messenger's two-step send.
    async fn send_literal(&self, target: &SessionTarget, text: &str) -> Result<(), SessionError>;

    /// Sends a bare Enter keystroke.
    async fn send_enter(&self, target: &SessionTarget) -> Result<(), SessionError>;

    /// Sends Escape, used both to exit copy mode and as the first half of
    /// a pane reset between retry attempts.
    async fn send_escape(&self, target: &SessionTarget) -> Result<(), SessionError>;

    /// Sends Ctrl-C. Gated by the caller's `allow_ctrl_c` policy flag —
    /// never sent automatically.
    async fn send_ctrl_c(&self, target: &SessionTarget) -> Result<(), SessionError>;

    /// Whether the pane is currently in tmux copy mode (scrollback browse),
    /// which swallows keystrokes rather than forwarding them to the
    /// foreground process.
    async fn is_in_copy_mode(&self, target: &SessionTarget) -> Result<bool, SessionError>;

    /// The foreground command name running in the pane (e.g. `bash`,
    /// `node`), used by the Health Monitor to detect a drop to a shell.
    async fn foreground_command(&self, target: &SessionTarget) -> Result<Option<String>, SessionError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
