// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Project entity (spec §3) — a single unit of work submitted by the
//! operator and tracked through the queue, provisioning, and completion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, SessionName};

/// Lifecycle status of a Project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    TimingOut,
    Zombie,
}

impl ProjectStatus {
    /// Whether this transition is legal per the table in spec §3.
    ///
    /// `QUEUED→PROCESSING→{COMPLETED,FAILED,TIMING_OUT}`, `FAILED→QUEUED`
    /// (retry), `TIMING_OUT→FAILED` (cleanup).
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Queued, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, TimingOut)
                | (Failed, Queued)
                | (TimingOut, Failed)
                // A project may be marked Zombie from any non-terminal state
                // by an operator-initiated reconciliation; it is otherwise
                // unreachable from normal operation.
                | (Queued, Zombie)
                | (Processing, Zombie)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

/// Outcome of the auto-merge pipeline for a COMPLETED project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergedStatus {
    PendingMerge,
    Merged,
    MergeFailed,
}

/// Subscription / plan tier, used to pick a default role set (spec §4.6
/// step 2) when the specification text does not enumerate one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Pro,
    #[default]
    Max5,
    Max20,
    Console,
}

impl Plan {
    /// Default team size range for this plan tier, per spec §4.6 step 2.
    pub fn default_role_count(self) -> std::ops::RangeInclusive<usize> {
        match self {
            Plan::Pro => 1..=3,
            Plan::Max5 => 4..=5,
            Plan::Max20 => 6..=8,
            Plan::Console => 1..=3,
        }
    }

    /// Default roles for this plan when the spec doesn't enumerate any,
    /// ordered so the first `default_role_count().start()` entries are used.
    pub fn default_roles(self) -> &'static [&'static str] {
        match self {
            Plan::Pro | Plan::Console => &["orchestrator", "project-manager", "developer"],
            Plan::Max5 => &[
                "orchestrator",
                "project-manager",
                "developer",
                "tester",
                "testrunner",
            ],
            Plan::Max20 => &[
                "orchestrator",
                "project-manager",
                "developer",
                "tester",
                "testrunner",
                "devops",
                "sysadmin",
                "securityops",
            ],
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pro" => Ok(Plan::Pro),
            "max5" => Ok(Plan::Max5),
            "max20" => Ok(Plan::Max20),
            "console" => Ok(Plan::Console),
            other => Err(format!("unknown plan tier: {other}")),
        }
    }
}

/// A single unit of work submitted by the operator (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Filesystem location of the human-readable specification.
    pub spec_path: PathBuf,
    /// Target working copy (the project's primary git checkout).
    pub project_path: PathBuf,
    pub status: ProjectStatus,
    /// tmux session name; null until provisioning reaches step 3 of C6.
    pub main_session: Option<SessionName>,
    pub plan: Plan,
    pub enqueued_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub attempts: u32,
    pub batch_id: String,
    pub error_message: Option<String>,
    pub failed_components: Vec<String>,
    pub merged_status: Option<MergedStatus>,
    pub merged_at: Option<i64>,
}

impl Project {
    pub fn new(
        id: ProjectId,
        spec_path: PathBuf,
        project_path: PathBuf,
        plan: Plan,
        batch_id: String,
        enqueued_at: i64,
    ) -> Self {
        Self {
            id,
            spec_path,
            project_path,
            status: ProjectStatus::Queued,
            main_session: None,
            plan,
            enqueued_at,
            started_at: None,
            completed_at: None,
            attempts: 0,
            batch_id,
            error_message: None,
            failed_components: Vec::new(),
            merged_status: None,
            merged_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the provisioning grace window (testable property #2) has
    /// elapsed without `main_session` being set — a correctness violation
    /// the Health Monitor should never observe in practice.
    pub fn missing_session_past_grace(&self, now_epoch_secs: i64, grace_secs: i64) -> bool {
        self.status == ProjectStatus::Processing
            && self.main_session.is_none()
            && self
                .started_at
                .is_some_and(|started| now_epoch_secs - started > grace_secs)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
