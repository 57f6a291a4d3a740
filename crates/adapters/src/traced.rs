// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability: every real
//! `SessionAdapter`/`GitAdapter` the daemon constructs gets wrapped in one
//! of these before it's handed to the engine, so every tmux/git invocation
//! leaves a structured `tracing` span regardless of which module called it.

use std::path::Path;

use async_trait::async_trait;
use tracing::Instrument;

use crate::git::{GitAdapter, GitError};
use crate::session::{SessionAdapter, SessionError, SessionTarget};

#[derive(Clone)]
pub struct TracedSession<S> {
    inner: S,
}

impl<S> TracedSession<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SessionAdapter> SessionAdapter for TracedSession<S> {
    async fn create_session(&self, name: &str, cwd: &Path) -> Result<(), SessionError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create_session(name, cwd).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "session created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create_session failed"),
            }
            result
        }
        .instrument(tracing::info_span!("session.create_session", name, cwd = %cwd.display()))
        .await
    }

    async fn new_window(&self, session: &str, window_name: &str, cwd: &Path) -> Result<u32, SessionError> {
        let result = self.inner.new_window(session, window_name, cwd).await;
        match &result {
            Ok(idx) => tracing::info!(session, window_name, window_index = idx, "window created"),
            Err(e) => tracing::error!(session, window_name, error = %e, "new_window failed"),
        }
        result
    }

    async fn kill_session(&self, session: &str, force: bool) -> Result<(), SessionError> {
        let result = self.inner.kill_session(session, force).await;
        tracing::info_span!("session.kill_session", session, force).in_scope(|| match &result {
            Ok(()) => tracing::info!("killed"),
            Err(e) => tracing::warn!(error = %e, "kill_session failed (may be expected)"),
        });
        result
    }

    async fn capture_pane(&self, target: &SessionTarget, lines: u32) -> Result<String, SessionError> {
        let result = self.inner.capture_pane(target, lines).await;
        tracing::trace!(target = %target, lines, captured_len = result.as_ref().map(|s| s.len()).ok(), "captured");
        result
    }

    async fn window_exists(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        self.inner.window_exists(target).await
    }

    async fn session_exists(&self, session: &str) -> Result<bool, SessionError> {
        self.inner.session_exists(session).await
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        self.inner.list_sessions().await
    }

    async fn session_created_at(&self, session: &str) -> Result<Option<i64>, SessionError> {
        self.inner.session_created_at(session).await
    }

    async fn send_literal(&self, target: &SessionTarget, text: &str) -> Result<(), SessionError> {
        let result = self.inner.send_literal(target, text).await;
        if let Err(ref e) = result {
            tracing::error!(target = %target, error = %e, "send_literal failed");
        }
        result
    }

    async fn send_enter(&self, target: &SessionTarget) -> Result<(), SessionError> {
        let result = self.inner.send_enter(target).await;
        if let Err(ref e) = result {
            tracing::error!(target = %target, error = %e, "send_enter failed");
        }
        result
    }

    async fn send_escape(&self, target: &SessionTarget) -> Result<(), SessionError> {
        self.inner.send_escape(target).await
    }

    async fn send_ctrl_c(&self, target: &SessionTarget) -> Result<(), SessionError> {
        tracing::info!(target = %target, "sending ctrl-c");
        self.inner.send_ctrl_c(target).await
    }

    async fn is_in_copy_mode(&self, target: &SessionTarget) -> Result<bool, SessionError> {
        self.inner.is_in_copy_mode(target).await
    }

    async fn foreground_command(&self, target: &SessionTarget) -> Result<Option<String>, SessionError> {
        self.inner.foreground_command(target).await
    }
}

#[derive(Clone)]
pub struct TracedGit<G> {
    inner: G,
}

impl<G> TracedGit<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: GitAdapter> GitAdapter for TracedGit<G> {
    async fn create_branch(&self, repo: &Path, branch: &str, from: Option<&str>) -> Result<(), GitError> {
        let result = self.inner.create_branch(repo, branch, from).await;
        match &result {
            Ok(()) => tracing::info!(branch, "branch created"),
            Err(e) => tracing::error!(branch, error = %e, "create_branch failed"),
        }
        result
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        self.inner.branch_exists(repo, branch).await
    }

    async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        async {
            let result = self.inner.add_worktree(repo, path, branch).await;
            match &result {
                Ok(()) => tracing::info!("worktree created"),
                Err(e) => tracing::error!(error = %e, "add_worktree failed"),
            }
            result
        }
        .instrument(tracing::info_span!("git.add_worktree", path = %path.display(), branch))
        .await
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), GitError> {
        let result = self.inner.remove_worktree(repo, path, force).await;
        tracing::info_span!("git.remove_worktree", path = %path.display(), force).in_scope(|| match &result {
            Ok(()) => tracing::info!("removed"),
            Err(e) => tracing::warn!(error = %e, "remove_worktree failed (may be expected)"),
        });
        result
    }

    async fn list_worktrees(&self, repo: &Path) -> Result<Vec<std::path::PathBuf>, GitError> {
        self.inner.list_worktrees(repo).await
    }

    async fn is_clean(&self, worktree: &Path) -> Result<bool, GitError> {
        self.inner.is_clean(worktree).await
    }

    async fn current_branch(&self, worktree: &Path) -> Result<String, GitError> {
        self.inner.current_branch(worktree).await
    }

    async fn merge_ff_only(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        let start = std::time::Instant::now();
        let result = self.inner.merge_ff_only(repo, branch).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => tracing::info!(branch, elapsed_ms, "merged"),
            Err(e) => tracing::error!(branch, elapsed_ms, error = %e, "merge_ff_only failed"),
        }
        result
    }

    async fn tag(&self, repo: &Path, tag: &str, message: &str) -> Result<(), GitError> {
        let result = self.inner.tag(repo, tag, message).await;
        if let Err(ref e) = result {
            tracing::error!(tag, error = %e, "tag failed");
        }
        result
    }

    async fn push(&self, repo: &Path, refspec: &str) -> Result<(), GitError> {
        let result = self.inner.push(repo, refspec).await;
        if let Err(ref e) = result {
            tracing::error!(refspec, error = %e, "push failed");
        }
        result
    }

    async fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), GitError> {
        tracing::warn!(reference, "resetting hard");
        self.inner.reset_hard(repo, reference).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
