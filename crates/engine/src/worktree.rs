// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worktree Manager (spec.md §4.4, component C4): provisions one git
//! worktree per role, walking a four-rung strategy ladder so a dirty or
//! half-finished previous run never blocks a new one outright.

use std::path::{Path, PathBuf};

use thiserror::Error;

use orc_adapters::{GitAdapter, GitError};

use crate::config::WorktreeConfig;

/// Filename dropped in the primary worktree recording the branch the whole
/// project started from (spec.md §6), so a later merge or reset can find
/// its way back without re-deriving it from `git` state.
const STARTING_BRANCH_FILE: &str = "STARTING_BRANCH";

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("git error: {0}")]
    Git(#[from] GitError),
    #[error("every worktree strategy failed for role '{role}': {detail}")]
    AllStrategiesFailed { role: String, detail: String },
    #[error("io error recording starting branch: {0}")]
    Io(#[from] std::io::Error),
}

/// The working directory handed to a role's agent, and which rung of the
/// strategy ladder produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub path: PathBuf,
    pub branch: String,
    /// True only if every other strategy failed and this worktree was
    /// checked out detached at the current commit (rung 4).
    pub detached: bool,
}

pub struct WorktreeManager<G: GitAdapter> {
    git: G,
    config: WorktreeConfig,
}

impl<G: GitAdapter> WorktreeManager<G> {
    pub fn new(git: G, config: WorktreeConfig) -> Self {
        Self { git, config }
    }

    /// The sibling directory all of a project's role worktrees live under:
    /// `{parent}/{project-name}-tmux-worktrees/` (spec.md §6).
    pub fn worktrees_root(&self, project_path: &Path) -> PathBuf {
        let name = project_path.file_name().and_then(|n| n.to_str()).unwrap_or("project");
        let parent = project_path.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{name}-{}", self.config.worktrees_dir_suffix))
    }

    /// Provisions (or reuses) the worktree for `role`, walking the ladder:
    /// new branch, force-reuse an existing branch of the same name, reuse
    /// or (with `force`) replace an existing worktree at the same path,
    /// and finally a detached worktree at `HEAD`.
    pub async fn provision(
        &self,
        project_path: &Path,
        role: &str,
        starting_branch: &str,
        force: bool,
    ) -> Result<Workspace, WorktreeError> {
        let path = self.worktrees_root(project_path).join(role);
        let branch = format!("{starting_branch}-{role}");
        let mut errors = Vec::new();

        match self.git.create_branch(project_path, &branch, Some(starting_branch)).await {
            Ok(()) => match self.git.add_worktree(project_path, &path, &branch).await {
                Ok(()) => return Ok(Workspace { path, branch, detached: false }),
                Err(e) => errors.push(format!("rung 1 (add worktree): {e}")),
            },
            Err(e) => errors.push(format!("rung 1 (create branch): {e}")),
        }

        match self.git.add_worktree(project_path, &path, &branch).await {
            Ok(()) => return Ok(Workspace { path, branch, detached: false }),
            Err(e) => errors.push(format!("rung 2 (reuse branch): {e}")),
        }

        if self.git.list_worktrees(project_path).await?.contains(&path) {
            match self.git.is_clean(&path).await {
                Ok(true) => {
                    let current = self.git.current_branch(&path).await.unwrap_or_else(|_| branch.clone());
                    return Ok(Workspace { path, branch: current, detached: false });
                }
                Ok(false) if force => match self.git.remove_worktree(project_path, &path, true).await {
                    Ok(()) => match self.git.add_worktree(project_path, &path, &branch).await {
                        Ok(()) => return Ok(Workspace { path, branch, detached: false }),
                        Err(e) => errors.push(format!("rung 3 (re-add after force clear): {e}")),
                    },
                    Err(e) => errors.push(format!("rung 3 (remove dirty worktree): {e}")),
                },
                Ok(false) => errors.push("rung 3: worktree exists and is dirty; rerun with --force to replace it".to_string()),
                Err(e) => errors.push(format!("rung 3 (is_clean check): {e}")),
            }
        }

        match self.git.add_worktree(project_path, &path, "HEAD").await {
            Ok(()) => Ok(Workspace { path, branch: "HEAD".to_string(), detached: true }),
            Err(e) => {
                errors.push(format!("rung 4 (detached at HEAD): {e}"));
                Err(WorktreeError::AllStrategiesFailed { role: role.to_string(), detail: errors.join("; ") })
            }
        }
    }

    /// Removes a role's worktree, but only if it has nothing uncommitted —
    /// an unmerged agent's work is never silently discarded on release.
    pub async fn release(&self, project_path: &Path, workspace: &Workspace) -> Result<(), WorktreeError> {
        if self.git.is_clean(&workspace.path).await.unwrap_or(false) {
            self.git.remove_worktree(project_path, &workspace.path, false).await?;
        }
        Ok(())
    }

    /// Records the branch the project started from in the primary
    /// worktree, for a later merge or reset to find without re-deriving it.
    pub fn record_starting_branch(primary_worktree: &Path, branch: &str) -> std::io::Result<()> {
        std::fs::write(primary_worktree.join(STARTING_BRANCH_FILE), format!("{branch}\n"))
    }

    pub fn read_starting_branch(primary_worktree: &Path) -> std::io::Result<String> {
        Ok(std::fs::read_to_string(primary_worktree.join(STARTING_BRANCH_FILE))?.trim().to_string())
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
