// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree adapter (spec.md §4.4 Worktree Provisioner, §4.11
//! Auto-Merge Runner): everything the engine needs from `git` as a black
//! box — worktree add/remove, branch creation, fast-forward merge, tag,
//! push, and the plumbing reads the Health Monitor and lifecycle machinery
//! use to decide whether a worktree is still clean.

mod cli;

pub use cli::ProcessGitAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGitAdapter, GitCall};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepo(PathBuf),
    #[error("branch already exists: {0}")]
    BranchExists(String),
    #[error("worktree already exists at {0}")]
    WorktreeExists(PathBuf),
    #[error("merge conflict on branch {0}")]
    MergeConflict(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for the git operations this system performs against the
/// project's primary repository and its role worktrees.
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Creates a new branch from `from` (or the current HEAD if `None`),
    /// failing if it already exists.
    async fn create_branch(&self, repo: &Path, branch: &str, from: Option<&str>) -> Result<(), GitError>;

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;

    /// Adds a worktree at `path` checked out to `branch`.
    async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), GitError>;

    /// Removes a worktree, `force` discarding uncommitted changes in it.
    async fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), GitError>;

    async fn list_worktrees(&self, repo: &Path) -> Result<Vec<PathBuf>, GitError>;

    /// True if the worktree has no uncommitted changes (tracked or staged).
    async fn is_clean(&self, worktree: &Path) -> Result<bool, GitError>;

    async fn current_branch(&self, worktree: &Path) -> Result<String, GitError>;

    /// Fast-forward-only merge of `branch` into the current branch of
    /// `repo`. Returns `Err(GitError::MergeConflict)` rather than leaving a
    /// partial merge state.
    async fn merge_ff_only(&self, repo: &Path, branch: &str) -> Result<(), GitError>;

    async fn tag(&self, repo: &Path, tag: &str, message: &str) -> Result<(), GitError>;

    async fn push(&self, repo: &Path, refspec: &str) -> Result<(), GitError>;

    /// Hard-resets `repo`'s current branch to `reference` — used to restore
    /// from the Auto-Merge Runner's backup branch on `MERGE_FAILED`.
    async fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), GitError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
