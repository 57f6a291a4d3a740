// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory git adapter for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GitAdapter, GitError};

#[derive(Debug, Clone, PartialEq)]
pub enum GitCall {
    CreateBranch { branch: String },
    AddWorktree { path: PathBuf, branch: String },
    RemoveWorktree { path: PathBuf, force: bool },
    MergeFfOnly { branch: String },
    Tag { tag: String },
    Push { refspec: String },
    ResetHard { reference: String },
}

#[derive(Default)]
struct FakeGitState {
    branches: HashSet<String>,
    worktrees: HashMap<PathBuf, String>,
    dirty_worktrees: HashSet<PathBuf>,
    merge_conflicts: HashSet<String>,
    calls: Vec<GitCall>,
}

#[derive(Clone, Default)]
pub struct FakeGitAdapter {
    inner: Arc<Mutex<FakeGitState>>,
}

impl FakeGitAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.inner.lock().calls.clone()
    }

    pub fn mark_dirty(&self, worktree: &Path) {
        self.inner.lock().dirty_worktrees.insert(worktree.to_path_buf());
    }

    pub fn fail_merge(&self, branch: &str) {
        self.inner.lock().merge_conflicts.insert(branch.to_string());
    }
}

#[async_trait]
impl GitAdapter for FakeGitAdapter {
    async fn create_branch(&self, _repo: &Path, branch: &str, _from: Option<&str>) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::CreateBranch { branch: branch.to_string() });
        if !inner.branches.insert(branch.to_string()) {
            return Err(GitError::BranchExists(branch.to_string()));
        }
        Ok(())
    }

    async fn branch_exists(&self, _repo: &Path, branch: &str) -> Result<bool, GitError> {
        Ok(self.inner.lock().branches.contains(branch))
    }

    async fn add_worktree(&self, _repo: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::AddWorktree { path: path.to_path_buf(), branch: branch.to_string() });
        if inner.worktrees.contains_key(path) {
            return Err(GitError::WorktreeExists(path.to_path_buf()));
        }
        inner.worktrees.insert(path.to_path_buf(), branch.to_string());
        Ok(())
    }

    async fn remove_worktree(&self, _repo: &Path, path: &Path, force: bool) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::RemoveWorktree { path: path.to_path_buf(), force });
        inner.worktrees.remove(path);
        inner.dirty_worktrees.remove(path);
        Ok(())
    }

    async fn list_worktrees(&self, _repo: &Path) -> Result<Vec<PathBuf>, GitError> {
        Ok(self.inner.lock().worktrees.keys().cloned().collect())
    }

    async fn is_clean(&self, worktree: &Path) -> Result<bool, GitError> {
        Ok(!self.inner.lock().dirty_worktrees.contains(worktree))
    }

    async fn current_branch(&self, worktree: &Path) -> Result<String, GitError> {
        self.inner
            .lock()
            .worktrees
            .get(worktree)
            .cloned()
            .ok_or_else(|| GitError::NotARepo(worktree.to_path_buf()))
    }

    async fn merge_ff_only(&self, _repo: &Path, branch: &str) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::MergeFfOnly { branch: branch.to_string() });
        if inner.merge_conflicts.contains(branch) {
            return Err(GitError::MergeConflict(branch.to_string()));
        }
        Ok(())
    }

    async fn tag(&self, _repo: &Path, tag: &str, _message: &str) -> Result<(), GitError> {
        self.inner.lock().calls.push(GitCall::Tag { tag: tag.to_string() });
        Ok(())
    }

    async fn push(&self, _repo: &Path, refspec: &str) -> Result<(), GitError> {
        self.inner.lock().calls.push(GitCall::Push { refspec: refspec.to_string() });
        Ok(())
    }

    async fn reset_hard(&self, _repo: &Path, reference: &str) -> Result<(), GitError> {
        self.inner.lock().calls.push(GitCall::ResetHard { reference: reference.to_string() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
