// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use orc_shell::{safe_run, RetryPolicy, ShellError};

use super::{GitAdapter, GitError};

/// Wall-clock cap per git invocation. The Auto-Merge Runner's own 5-minute
/// per-project cap (spec.md §4.11) wraps several of these calls.
const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessGitAdapter;

impl ProcessGitAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn run(repo: &Path, args: &[&str], description: &str) -> Result<String, GitError> {
        match safe_run("git", args, Some(repo), TIMEOUT, RetryPolicy::NONE, description).await {
            Ok(out) => Ok(out.stdout),
            Err(ShellError::NonZeroExit { stderr, .. }) => Err(GitError::CommandFailed(stderr)),
            Err(e) => Err(GitError::CommandFailed(e.to_string())),
        }
    }
}

#[async_trait]
impl GitAdapter for ProcessGitAdapter {
    async fn create_branch(&self, repo: &Path, branch: &str, from: Option<&str>) -> Result<(), GitError> {
        if self.branch_exists(repo, branch).await? {
            return Err(GitError::BranchExists(branch.to_string()));
        }
        let mut args = vec!["branch", branch];
        if let Some(from) = from {
            args.push(from);
        }
        Self::run(repo, &args, "git branch").await?;
        Ok(())
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        let refname = format!("refs/heads/{branch}");
        let result = Self::run(repo, &["show-ref", "--verify", "--quiet", &refname], "git show-ref").await;
        Ok(result.is_ok())
    }

    async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        if path.exists() {
            return Err(GitError::WorktreeExists(path.to_path_buf()));
        }
        let path_str = path.to_string_lossy();
        Self::run(repo, &["worktree", "add", &path_str, branch], "git worktree add").await?;
        Ok(())
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        Self::run(repo, &args, "git worktree remove").await?;
        Ok(())
    }

    async fn list_worktrees(&self, repo: &Path) -> Result<Vec<PathBuf>, GitError> {
        let out = Self::run(repo, &["worktree", "list", "--porcelain"], "git worktree list").await?;
        Ok(out
            .lines()
            .filter_map(|line| line.strip_prefix("worktree "))
            .map(PathBuf::from)
            .collect())
    }

    async fn is_clean(&self, worktree: &Path) -> Result<bool, GitError> {
        let out = Self::run(worktree, &["status", "--porcelain"], "git status").await?;
        Ok(out.trim().is_empty())
    }

    async fn current_branch(&self, worktree: &Path) -> Result<String, GitError> {
        let out = Self::run(worktree, &["rev-parse", "--abbrev-ref", "HEAD"], "git rev-parse").await?;
        Ok(out.trim().to_string())
    }

    async fn merge_ff_only(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        match Self::run(repo, &["merge", "--ff-only", branch], "git merge").await {
            Ok(_) => Ok(()),
            Err(GitError::CommandFailed(stderr)) => Err(GitError::MergeConflict(format!("{branch}: {stderr}"))),
            Err(e) => Err(e),
        }
    }

    async fn tag(&self, repo: &Path, tag: &str, message: &str) -> Result<(), GitError> {
        Self::run(repo, &["tag", "-a", tag, "-m", message], "git tag").await?;
        Ok(())
    }

    async fn push(&self, repo: &Path, refspec: &str) -> Result<(), GitError> {
        Self::run(repo, &["push", "origin", refspec], "git push").await?;
        Ok(())
    }

    async fn reset_hard(&self, repo: &Path, reference: &str) -> Result<(), GitError> {
        Self::run(repo, &["reset", "--hard", reference], "git reset").await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
