// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event log's wire format. Every state change in the system is first
//! expressed as an `Event`, appended to the WAL, then folded into
//! `MaterializedState` by `apply_event` — `apply_event` must be idempotent
//! since crash recovery may replay the tail of the log more than once.

use serde::{Deserialize, Serialize};

use crate::authorization::{AuthorizationOutcome, Priority};
use crate::failure::FailureReason;
use crate::health::HealthStatus;
use crate::ids::{AuthorizationId, FailureId, ProjectId, Role, SessionName, TaskId};
use crate::project::{MergedStatus, Plan, ProjectStatus};
use crate::session::WaitingFor;
use crate::task::TaskStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "project:enqueued")]
    ProjectEnqueued {
        project_id: ProjectId,
        spec_path: std::path::PathBuf,
        project_path: std::path::PathBuf,
        plan: Plan,
        batch_id: String,
        enqueued_at: i64,
    },
    #[serde(rename = "project:status_changed")]
    ProjectStatusChanged {
        project_id: ProjectId,
        from: ProjectStatus,
        to: ProjectStatus,
        at: i64,
        error_message: Option<String>,
        failed_components: Vec<String>,
    },
    #[serde(rename = "project:session_attached")]
    ProjectSessionAttached {
        project_id: ProjectId,
        session_name: SessionName,
        at: i64,
    },
    #[serde(rename = "project:attempt_incremented")]
    ProjectAttemptIncremented { project_id: ProjectId, attempts: u32 },
    #[serde(rename = "project:merge_status_changed")]
    ProjectMergeStatusChanged {
        project_id: ProjectId,
        status: MergedStatus,
        at: i64,
    },

    #[serde(rename = "task:upserted")]
    TaskUpserted {
        task_id: TaskId,
        target: SessionName,
        message: String,
        dedup_key: String,
        interval_minutes: Option<u32>,
        next_run_epoch: i64,
        created_at: i64,
    },
    #[serde(rename = "task:claimed")]
    TaskClaimed { task_ids: Vec<TaskId>, at: i64 },
    #[serde(rename = "task:delivery_succeeded")]
    TaskDeliverySucceeded { task_id: TaskId, at: i64 },
    #[serde(rename = "task:delivery_failed")]
    TaskDeliveryFailed { task_id: TaskId, at: i64 },
    #[serde(rename = "task:status_set")]
    TaskStatusSet { task_id: TaskId, status: TaskStatus },
    #[serde(rename = "task:removed")]
    TaskRemoved { task_id: TaskId },

    #[serde(rename = "session:created")]
    SessionCreated {
        project_id: ProjectId,
        session_name: SessionName,
        starting_branch: String,
        created_at: i64,
    },
    #[serde(rename = "session:agent_added")]
    SessionAgentAdded {
        session_name: SessionName,
        role: Role,
        window_index: u32,
        worktree: std::path::PathBuf,
        branch: String,
        at: i64,
    },
    #[serde(rename = "session:agent_activity")]
    SessionAgentActivity {
        session_name: SessionName,
        role: Role,
        at: i64,
        waiting_for: WaitingFor,
    },
    #[serde(rename = "session:phantom_suspected")]
    SessionPhantomSuspected { session_name: SessionName },
    #[serde(rename = "session:phantom_cleared")]
    SessionPhantomCleared { session_name: SessionName },

    #[serde(rename = "health:swept")]
    HealthSwept {
        project_id: ProjectId,
        role: Role,
        status: HealthStatus,
        foreground_command: Option<String>,
        at: i64,
    },
    #[serde(rename = "health:recovery_attempted")]
    HealthRecoveryAttempted { project_id: ProjectId, role: Role, at: i64 },

    #[serde(rename = "authorization:requested")]
    AuthorizationRequested {
        authorization_id: AuthorizationId,
        session_name: SessionName,
        request_id: String,
        project_id: ProjectId,
        from_role: Role,
        to_role: Role,
        priority: Priority,
        action: String,
        requested_at: i64,
    },
    #[serde(rename = "authorization:resolved")]
    AuthorizationResolved {
        authorization_id: AuthorizationId,
        outcome: AuthorizationOutcome,
        resolution: Option<String>,
        at: i64,
    },

    #[serde(rename = "failure:recorded")]
    FailureRecorded {
        failure_id: FailureId,
        project_id: ProjectId,
        session_name: Option<SessionName>,
        reason: FailureReason,
        detail: String,
        failed_components: Vec<String>,
        occurred_at: i64,
        duration_hours: f64,
        spec_path: std::path::PathBuf,
        agent_count: usize,
        report_path: Option<std::path::PathBuf>,
    },
}

impl Event {
    /// A short tag for logging/metrics, matching the `serde(rename)` on the
    /// variant without needing to serialize it.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ProjectEnqueued { .. } => "project:enqueued",
            Event::ProjectStatusChanged { .. } => "project:status_changed",
            Event::ProjectSessionAttached { .. } => "project:session_attached",
            Event::ProjectAttemptIncremented { .. } => "project:attempt_incremented",
            Event::ProjectMergeStatusChanged { .. } => "project:merge_status_changed",
            Event::TaskUpserted { .. } => "task:upserted",
            Event::TaskClaimed { .. } => "task:claimed",
            Event::TaskDeliverySucceeded { .. } => "task:delivery_succeeded",
            Event::TaskDeliveryFailed { .. } => "task:delivery_failed",
            Event::TaskStatusSet { .. } => "task:status_set",
            Event::TaskRemoved { .. } => "task:removed",
            Event::SessionCreated { .. } => "session:created",
            Event::SessionAgentAdded { .. } => "session:agent_added",
            Event::SessionAgentActivity { .. } => "session:agent_activity",
            Event::SessionPhantomSuspected { .. } => "session:phantom_suspected",
            Event::SessionPhantomCleared { .. } => "session:phantom_cleared",
            Event::HealthSwept { .. } => "health:swept",
            Event::HealthRecoveryAttempted { .. } => "health:recovery_attempted",
            Event::AuthorizationRequested { .. } => "authorization:requested",
            Event::AuthorizationResolved { .. } => "authorization:resolved",
            Event::FailureRecorded { .. } => "failure:recorded",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
