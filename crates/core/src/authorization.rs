// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization requests (spec §3) — a cross-role approval request, e.g.
//! an agent asking a peer role or the operator for permission to proceed
//! past a risky action.

use serde::{Deserialize, Serialize};

use crate::ids::{AuthorizationId, ProjectId, Role, SessionName};

/// Urgency of a request. Wire values are the bare integers spec.md uses
/// (`priority ∈ {1,2,3}`), most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "1")]
    P1,
    #[serde(rename = "2")]
    P2,
    #[serde(rename = "3")]
    P3,
}

impl Priority {
    /// How long an unanswered request waits before it auto-escalates,
    /// keyed to urgency (spec.md:62).
    pub fn timeout_minutes(self) -> u32 {
        match self {
            Priority::P1 => 5,
            Priority::P2 => 15,
            Priority::P3 => 30,
        }
    }

    pub fn timeout_secs(self) -> i64 {
        i64::from(self.timeout_minutes()) * 60
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationOutcome {
    Pending,
    Approved,
    Denied,
    Escalated,
}

/// A cross-role approval request (spec.md:60-63).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: AuthorizationId,
    pub session_name: SessionName,
    /// UUID correlating this row back to the agent's own `waiting_for`
    /// record (`orc_core::session::WaitingFor::Authorization`).
    pub request_id: String,
    pub project_id: ProjectId,
    pub from_role: Role,
    pub to_role: Role,
    pub priority: Priority,
    pub action: String,
    pub timeout_minutes: u32,
    pub status: AuthorizationOutcome,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    pub resolution: Option<String>,
}

impl Authorization {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AuthorizationId,
        session_name: SessionName,
        request_id: String,
        project_id: ProjectId,
        from_role: Role,
        to_role: Role,
        priority: Priority,
        action: String,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            session_name,
            request_id,
            project_id,
            from_role,
            to_role,
            timeout_minutes: priority.timeout_minutes(),
            priority,
            action,
            status: AuthorizationOutcome::Pending,
            created_at,
            resolved_at: None,
            resolution: None,
        }
    }

    pub fn deadline_epoch(&self) -> i64 {
        self.created_at + i64::from(self.timeout_minutes) * 60
    }

    /// Fraction of the timeout elapsed, clamped to >= 0. Not clamped above
    /// 1 so callers can tell an overdue-but-unescalated request from one
    /// that has run well past its deadline.
    pub fn elapsed_fraction(&self, now_epoch: i64) -> f64 {
        let timeout_secs = i64::from(self.timeout_minutes) * 60;
        if timeout_secs <= 0 {
            return 1.0;
        }
        ((now_epoch - self.created_at) as f64 / timeout_secs as f64).max(0.0)
    }

    /// Spec.md:63's escalation trigger: still pending past 80% of its
    /// timeout window.
    pub fn is_overdue(&self, now_epoch: i64) -> bool {
        self.status == AuthorizationOutcome::Pending && self.elapsed_fraction(now_epoch) >= 0.8
    }

    pub fn resolve(&mut self, outcome: AuthorizationOutcome, resolution: Option<String>, now_epoch: i64) {
        self.status = outcome;
        self.resolved_at = Some(now_epoch);
        self.resolution = resolution;
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
