// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Project Queue (spec.md §4.8, component C8): a FIFO over Project rows
//! with status=QUEUED. Batch submission shares a `batch_id`; the queue
//! always hands the lifecycle engine the oldest-enqueued eligible project,
//! and never promotes a second one while any project is PROCESSING — the
//! hard-coded single-concurrency invariant spec.md §4.8 and §9 require to
//! be enforced by the queue and the store, not a constant an operator could
//! override via the environment.

use thiserror::Error;

use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::id::IdGen;
use orc_core::ids::ProjectId;
use orc_core::project::{Plan, Project, ProjectStatus};
use orc_storage::{Store, StoreError};

/// Non-overridable: spec.md §4.8's "a hard-coded `max_concurrent = 1` is
/// non-overridable via environment." Kept as a `const`, not a `Config`
/// field, precisely so nothing can thread an environment override to it.
pub const MAX_CONCURRENT: usize = 1;

/// Retry cap for re-enqueue on failure (spec.md §7, §8 testable property 6).
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("project {0} not found")]
    NotFound(String),
    #[error("project {0} is not FAILED, cannot reset")]
    NotFailed(String),
    #[error("project {0} is not QUEUED, cannot remove")]
    NotQueued(String),
}

pub struct ProjectQueue<C: Clock, I: IdGen> {
    clock: C,
    id_gen: I,
}

impl<C: Clock, I: IdGen> ProjectQueue<C, I> {
    pub fn new(clock: C, id_gen: I) -> Self {
        Self { clock, id_gen }
    }

    /// Enqueues a single project under its own fresh `batch_id`.
    pub fn submit(
        &self,
        store: &mut Store,
        spec_path: std::path::PathBuf,
        project_path: std::path::PathBuf,
        plan: Plan,
    ) -> Result<ProjectId, QueueError> {
        let batch_id = self.id_gen.next();
        self.submit_with_batch(store, spec_path, project_path, plan, batch_id)
    }

    /// Enqueues `specs` sharing one `batch_id` (spec.md §4.8's `--batch`
    /// submission), returning the id of every project created, in order.
    pub fn submit_batch(
        &self,
        store: &mut Store,
        specs: Vec<(std::path::PathBuf, std::path::PathBuf, Plan)>,
    ) -> Result<(String, Vec<ProjectId>), QueueError> {
        let batch_id = self.id_gen.next();
        let mut ids = Vec::with_capacity(specs.len());
        for (spec_path, project_path, plan) in specs {
            ids.push(self.submit_with_batch(store, spec_path, project_path, plan, batch_id.clone())?);
        }
        Ok((batch_id, ids))
    }

    fn submit_with_batch(
        &self,
        store: &mut Store,
        spec_path: std::path::PathBuf,
        project_path: std::path::PathBuf,
        plan: Plan,
        batch_id: String,
    ) -> Result<ProjectId, QueueError> {
        let project_id = ProjectId::new(self.id_gen.next());
        store.append(Event::ProjectEnqueued {
            project_id: project_id.clone(),
            spec_path,
            project_path,
            plan,
            batch_id,
            enqueued_at: self.clock.epoch_secs(),
        })?;
        Ok(project_id)
    }

    /// True while any project holds the single PROCESSING slot.
    pub fn has_processing(&self, store: &Store) -> bool {
        store.state.processing_project().is_some()
    }

    /// The oldest-enqueued QUEUED project under the retry cap, or `None`
    /// if the queue is empty or the single-concurrency slot is held.
    /// Callers drive `LifecycleEngine::provision` with the id this returns.
    pub fn next_queued<'a>(&self, store: &'a Store) -> Option<&'a Project> {
        if self.has_processing(store) {
            return None;
        }
        store
            .state
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Queued && p.attempts < MAX_ATTEMPTS)
            .min_by_key(|p| (p.enqueued_at, p.id.as_str().to_string()))
    }

    pub fn list<'a>(&self, store: &'a Store) -> Vec<&'a Project> {
        let mut projects: Vec<&Project> = store.state.projects.values().collect();
        projects.sort_by_key(|p| p.enqueued_at);
        projects
    }

    pub fn status<'a>(&self, store: &'a Store, id: &ProjectId) -> Option<&'a Project> {
        store.state.projects.get(id)
    }

    /// Operator `queue --reset`: force a FAILED project back to QUEUED with
    /// a clean attempt counter, regardless of the retry cap — an explicit
    /// override of the automatic retry-on-failure path.
    pub fn reset(&self, store: &mut Store, id: &ProjectId) -> Result<(), QueueError> {
        let project = store.state.projects.get(id).cloned().ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        if project.status != ProjectStatus::Failed {
            return Err(QueueError::NotFailed(id.to_string()));
        }
        let now = self.clock.epoch_secs();
        store.state.transition_project(id, ProjectStatus::Queued)?;
        store.append(Event::ProjectStatusChanged {
            project_id: id.clone(),
            from: ProjectStatus::Failed,
            to: ProjectStatus::Queued,
            at: now,
            error_message: None,
            failed_components: Vec::new(),
        })?;
        store.append(Event::ProjectAttemptIncremented { project_id: id.clone(), attempts: 0 })?;
        Ok(())
    }

    /// Operator `queue --remove`: withdraws a project that has not started
    /// processing yet. Implemented as a transition to ZOMBIE rather than a
    /// hard delete — the event log is append-only, and a ZOMBIE project is
    /// excluded from `next_queued` and every listing an operator cares
    /// about going forward.
    pub fn remove(&self, store: &mut Store, id: &ProjectId) -> Result<(), QueueError> {
        let project = store.state.projects.get(id).cloned().ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        if project.status != ProjectStatus::Queued {
            return Err(QueueError::NotQueued(id.to_string()));
        }
        let now = self.clock.epoch_secs();
        store.state.transition_project(id, ProjectStatus::Zombie)?;
        store.append(Event::ProjectStatusChanged {
            project_id: id.clone(),
            from: ProjectStatus::Queued,
            to: ProjectStatus::Zombie,
            at: now,
            error_message: Some("removed by operator".to_string()),
            failed_components: Vec::new(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
