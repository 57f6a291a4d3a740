// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AgentHealth: the Health Monitor's (C9) persisted view of each agent,
//! distinct from the live `session::AgentState` the runtime mutates on
//! every activity tick — this is the sweep-by-sweep judgement record.

use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    /// Foreground command / pane content unchanged across a sweep interval.
    Stuck,
    /// Session or window could not be found; pattern-match fallback engaged.
    Phantom,
    /// Recovery has been attempted and the agent is being watched.
    Recovering,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealth {
    pub project_id: ProjectId,
    pub role: Role,
    pub status: HealthStatus,
    pub last_checked_epoch: i64,
    pub last_foreground_command: Option<String>,
    pub recovery_attempts: u32,
    /// Set once provisioning completes; the 4-hour protective grace window
    /// (spec §4.9) is measured from this timestamp, not `created_at`.
    pub monitoring_started_epoch: i64,
}

impl AgentHealth {
    pub fn new(project_id: ProjectId, role: Role, monitoring_started_epoch: i64) -> Self {
        Self {
            project_id,
            role,
            status: HealthStatus::Healthy,
            last_checked_epoch: monitoring_started_epoch,
            last_foreground_command: None,
            recovery_attempts: 0,
            monitoring_started_epoch,
        }
    }

    /// Whether the 4-hour protective grace window has elapsed, i.e. it's
    /// now safe to act on a suspected-stuck finding.
    pub fn past_grace_window(&self, now_epoch: i64, grace_secs: i64) -> bool {
        now_epoch - self.monitoring_started_epoch > grace_secs
    }

    pub fn record_sweep(
        &mut self,
        now_epoch: i64,
        status: HealthStatus,
        foreground_command: Option<String>,
    ) {
        self.last_checked_epoch = now_epoch;
        self.status = status;
        self.last_foreground_command = foreground_command;
    }

    pub fn record_recovery_attempt(&mut self, now_epoch: i64) {
        self.recovery_attempts += 1;
        self.status = HealthStatus::Recovering;
        self.last_checked_epoch = now_epoch;
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
