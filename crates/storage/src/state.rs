// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MaterializedState`: the single in-memory view every read goes through.
//! It is reached only by replaying [`Event`]s via [`MaterializedState::apply_event`],
//! which must be idempotent — crash recovery may replay the WAL tail more
//! than once against a snapshot that already reflects some of those events.

use std::collections::{BTreeMap, HashMap};

use orc_core::authorization::Authorization;
use orc_core::event::Event;
use orc_core::failure::FailureRecord;
use orc_core::health::AgentHealth;
use orc_core::ids::{AuthorizationId, ProjectId, Role, SessionName, TaskId};
use orc_core::project::{Project, ProjectStatus};
use orc_core::session::{AgentState, SessionState};
use orc_core::task::{ScheduledTask, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Snapshot-serializable, replay-built state. Every table is owned here;
/// nothing downstream holds a second copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub projects: HashMap<ProjectId, Project>,
    pub tasks: HashMap<TaskId, ScheduledTask>,
    pub sessions: HashMap<SessionName, SessionState>,
    pub health: HashMap<(ProjectId, Role), AgentHealth>,
    pub authorizations: HashMap<AuthorizationId, Authorization>,
    pub failures: Vec<FailureRecord>,

    /// The single PROCESSING project, if any — enforces the queue's
    /// single-concurrency invariant without a linear scan.
    processing_project: Option<ProjectId>,
    /// Tasks due at or before a given epoch second, ordered for dispatch.
    #[serde(skip)]
    due_index: BTreeMap<i64, Vec<TaskId>>,
    /// `dedup_key` -> task id, for idempotent `upsert_scheduled_task`.
    dedup_index: HashMap<String, TaskId>,
    /// Last applied WAL sequence number, for idempotent replay.
    pub last_applied_seq: Option<u64>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the `due_index` from `tasks` — needed after deserializing a
    /// snapshot, since the index itself isn't persisted.
    pub fn reindex(&mut self) {
        self.due_index.clear();
        for task in self.tasks.values() {
            if task.status == TaskStatus::Pending {
                self.due_index.entry(task.next_run_epoch).or_default().push(task.id.clone());
            }
        }
    }

    pub fn processing_project(&self) -> Option<&ProjectId> {
        self.processing_project.as_ref()
    }

    /// Applies a single event to the state. Idempotent with respect to
    /// `seq`: an event whose sequence number is not strictly greater than
    /// `last_applied_seq` is a no-op.
    pub fn apply_event(&mut self, seq: u64, event: &Event) {
        if let Some(last) = self.last_applied_seq {
            if seq <= last {
                return;
            }
        }
        self.apply(event);
        self.last_applied_seq = Some(seq);
    }

    fn apply(&mut self, event: &Event) {
        match event {
            Event::ProjectEnqueued {
                project_id,
                spec_path,
                project_path,
                plan,
                batch_id,
                enqueued_at,
            } => {
                let project = Project::new(
                    project_id.clone(),
                    spec_path.clone(),
                    project_path.clone(),
                    *plan,
                    batch_id.clone(),
                    *enqueued_at,
                );
                self.projects.insert(project_id.clone(), project);
            }
            Event::ProjectStatusChanged {
                project_id,
                to,
                at,
                error_message,
                failed_components,
                ..
            } => {
                if let Some(project) = self.projects.get_mut(project_id) {
                    project.status = *to;
                    project.error_message = error_message.clone();
                    project.failed_components = failed_components.clone();
                    match to {
                        ProjectStatus::Processing => {
                            project.started_at = Some(*at);
                            self.processing_project = Some(project_id.clone());
                        }
                        ProjectStatus::Completed | ProjectStatus::Failed => {
                            project.completed_at = Some(*at);
                            if self.processing_project.as_ref() == Some(project_id) {
                                self.processing_project = None;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::ProjectSessionAttached { project_id, session_name, .. } => {
                if let Some(project) = self.projects.get_mut(project_id) {
                    project.main_session = Some(session_name.clone());
                }
            }
            Event::ProjectAttemptIncremented { project_id, attempts } => {
                if let Some(project) = self.projects.get_mut(project_id) {
                    project.attempts = *attempts;
                }
            }
            Event::ProjectMergeStatusChanged { project_id, status, at } => {
                if let Some(project) = self.projects.get_mut(project_id) {
                    project.merged_status = Some(*status);
                    project.merged_at = Some(*at);
                }
            }

            Event::TaskUpserted {
                task_id,
                target,
                message,
                dedup_key,
                interval_minutes,
                next_run_epoch,
                created_at,
            } => {
                if self.dedup_index.contains_key(dedup_key) {
                    return;
                }
                let task = ScheduledTask {
                    id: task_id.clone(),
                    target: target.clone(),
                    message: message.clone(),
                    dedup_key: dedup_key.clone(),
                    interval_minutes: *interval_minutes,
                    next_run_epoch: *next_run_epoch,
                    status: TaskStatus::Pending,
                    dispatch_count: 0,
                    created_at: *created_at,
                };
                self.due_index.entry(task.next_run_epoch).or_default().push(task.id.clone());
                self.dedup_index.insert(dedup_key.clone(), task_id.clone());
                self.tasks.insert(task_id.clone(), task);
            }
            Event::TaskClaimed { task_ids, .. } => {
                for id in task_ids {
                    if let Some(task) = self.tasks.get_mut(id) {
                        self.remove_from_due_index(id, task.next_run_epoch);
                        task.status = TaskStatus::Dispatching;
                    }
                }
            }
            Event::TaskDeliverySucceeded { task_id, at } => {
                if let Some(task) = self.tasks.get_mut(task_id) {
                    task.record_delivery_success(*at);
                    if task.status == TaskStatus::Pending {
                        self.due_index.entry(task.next_run_epoch).or_default().push(task_id.clone());
                    }
                }
                // One-shot tasks are deleted on successful dispatch rather
                // than left sitting in `Done` (spec.md:51).
                if matches!(self.tasks.get(task_id).map(|t| t.status), Some(TaskStatus::Done)) {
                    if let Some(task) = self.tasks.remove(task_id) {
                        self.dedup_index.remove(&task.dedup_key);
                    }
                }
            }
            Event::TaskDeliveryFailed { task_id, at } => {
                if let Some(task) = self.tasks.get_mut(task_id) {
                    task.record_delivery_failure(*at);
                    if task.status == TaskStatus::Pending {
                        self.due_index.entry(task.next_run_epoch).or_default().push(task_id.clone());
                    }
                }
            }
            Event::TaskStatusSet { task_id, status } => {
                if let Some(task) = self.tasks.get_mut(task_id) {
                    task.status = *status;
                }
            }
            Event::TaskRemoved { task_id } => {
                if let Some(task) = self.tasks.remove(task_id) {
                    self.dedup_index.remove(&task.dedup_key);
                    self.remove_from_due_index(task_id, task.next_run_epoch);
                }
            }

            Event::SessionCreated { project_id, session_name, starting_branch, created_at } => {
                self.sessions.insert(
                    session_name.clone(),
                    SessionState::new(project_id.clone(), session_name.clone(), starting_branch.clone(), *created_at),
                );
            }
            Event::SessionAgentAdded { session_name, role, window_index, worktree, branch, at } => {
                if let Some(session) = self.sessions.get_mut(session_name) {
                    session.add_agent(AgentState::new(role.clone(), *window_index, worktree.clone(), branch.clone(), *at));
                }
            }
            Event::SessionAgentActivity { session_name, role, at, waiting_for } => {
                if let Some(session) = self.sessions.get_mut(session_name) {
                    if let Some(agent) = session.agents.get_mut(role) {
                        agent.last_activity_epoch = *at;
                        agent.waiting_for = waiting_for.clone();
                    }
                }
            }
            Event::SessionPhantomSuspected { session_name } => {
                if let Some(session) = self.sessions.get_mut(session_name) {
                    session.record_phantom_suspicion();
                }
            }
            Event::SessionPhantomCleared { session_name } => {
                if let Some(session) = self.sessions.get_mut(session_name) {
                    session.clear_phantom_suspicion();
                }
            }

            Event::HealthSwept { project_id, role, status, foreground_command, at } => {
                let entry = self
                    .health
                    .entry((project_id.clone(), role.clone()))
                    .or_insert_with(|| AgentHealth::new(project_id.clone(), role.clone(), *at));
                entry.record_sweep(*at, *status, foreground_command.clone());
            }
            Event::HealthRecoveryAttempted { project_id, role, at } => {
                if let Some(entry) = self.health.get_mut(&(project_id.clone(), role.clone())) {
                    entry.record_recovery_attempt(*at);
                }
            }

            Event::AuthorizationRequested {
                authorization_id,
                session_name,
                request_id,
                project_id,
                from_role,
                to_role,
                priority,
                action,
                requested_at,
            } => {
                self.authorizations.insert(
                    authorization_id.clone(),
                    Authorization::new(
                        authorization_id.clone(),
                        session_name.clone(),
                        request_id.clone(),
                        project_id.clone(),
                        from_role.clone(),
                        to_role.clone(),
                        *priority,
                        action.clone(),
                        *requested_at,
                    ),
                );
            }
            Event::AuthorizationResolved { authorization_id, outcome, resolution, at } => {
                if let Some(auth) = self.authorizations.get_mut(authorization_id) {
                    auth.resolve(*outcome, resolution.clone(), *at);
                }
            }

            Event::FailureRecorded {
                failure_id,
                project_id,
                session_name,
                reason,
                detail,
                failed_components,
                occurred_at,
                duration_hours,
                spec_path,
                agent_count,
                report_path,
            } => {
                self.failures.push(FailureRecord::new(
                    failure_id.clone(),
                    project_id.clone(),
                    session_name.clone(),
                    *reason,
                    detail.clone(),
                    failed_components.clone(),
                    *occurred_at,
                    *duration_hours,
                    spec_path.clone(),
                    *agent_count,
                    report_path.clone(),
                ));
            }
        }
    }

    fn remove_from_due_index(&mut self, id: &TaskId, epoch: i64) {
        if let Some(bucket) = self.due_index.get_mut(&epoch) {
            bucket.retain(|t| t != id);
            if bucket.is_empty() {
                self.due_index.remove(&epoch);
            }
        }
    }

    /// Every task with `status == Pending` and `next_run_epoch <= now`, in
    /// `(next_run_epoch ASC, id ASC)` order.
    pub fn due_tasks(&self, now: i64) -> Vec<&ScheduledTask> {
        let mut out = Vec::new();
        for (_, ids) in self.due_index.range(..=now) {
            let mut ids = ids.clone();
            ids.sort();
            for id in ids {
                if let Some(task) = self.tasks.get(&id) {
                    out.push(task);
                }
            }
        }
        out
    }

    /// Resolves an idempotent upsert-by-`dedup_key` without applying an
    /// event, so callers can decide whether a new event is even needed.
    pub fn existing_task_for_dedup_key(&self, dedup_key: &str) -> Option<&ScheduledTask> {
        self.dedup_index.get(dedup_key).and_then(|id| self.tasks.get(id))
    }

    pub fn transition_project(&self, id: &ProjectId, to: ProjectStatus) -> Result<(), StoreError> {
        let project = self.projects.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !project.status.can_transition_to(to) {
            return Err(StoreError::IllegalTransition {
                from: format!("{:?}", project.status),
                to: format!("{to:?}"),
            });
        }
        if to == ProjectStatus::Processing && self.processing_project.is_some() && self.processing_project.as_ref() != Some(id) {
            return Err(StoreError::AlreadyProcessing);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
