// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session and per-agent runtime state (spec §3, §4.3, §4.9).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, Role, SessionName};

/// What an agent is currently blocked on, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum WaitingFor {
    /// Blocked on an authorization decision (spec §4.9 auth re-verification).
    /// `request_id` correlates back to the `Authorization` row the Health
    /// Monitor opened for this request.
    Authorization { request_id: String, to_role: Role, since: i64, timeout_minutes: u32 },
    /// Blocked on a peer agent's deliverable.
    Peer { role: Role },
    /// No blocking condition recorded.
    Nothing,
}

/// Per-agent runtime state within a project's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub role: Role,
    pub window_index: u32,
    pub worktree: std::path::PathBuf,
    pub branch: String,
    pub last_activity_epoch: i64,
    pub waiting_for: WaitingFor,
    /// Incremented each time the Health Monitor performs stuck-agent
    /// recovery on this agent (spec §4.9).
    pub recovery_attempts: u32,
    /// Sliding-window count of status-report messages this role has sent in
    /// the current 5-minute bucket (spec §9 rate-limit requirement).
    pub status_reports_this_window: u32,
}

impl AgentState {
    pub fn new(role: Role, window_index: u32, worktree: std::path::PathBuf, branch: String, now: i64) -> Self {
        Self {
            role,
            window_index,
            worktree,
            branch,
            last_activity_epoch: now,
            waiting_for: WaitingFor::Nothing,
            recovery_attempts: 0,
            status_reports_this_window: 0,
        }
    }

    pub fn is_idle_for(&self, now: i64, threshold_secs: i64) -> bool {
        now - self.last_activity_epoch > threshold_secs
    }
}

/// The tmux-session-level view of a running project (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub project_id: ProjectId,
    pub session_name: SessionName,
    pub starting_branch: String,
    pub agents: BTreeMap<Role, AgentState>,
    pub created_at: i64,
    /// Bumped on every sweep that finds the session suspiciously absent;
    /// two consecutive increments are required before the Health Monitor
    /// acts, per spec §4.9's phantom-suspicion confirmation rule.
    pub phantom_sweep_count: u32,
}

impl SessionState {
    pub fn new(
        project_id: ProjectId,
        session_name: SessionName,
        starting_branch: String,
        created_at: i64,
    ) -> Self {
        Self {
            project_id,
            session_name,
            starting_branch,
            agents: BTreeMap::new(),
            created_at,
            phantom_sweep_count: 0,
        }
    }

    pub fn add_agent(&mut self, agent: AgentState) {
        self.agents.insert(agent.role.clone(), agent);
    }

    pub fn record_phantom_suspicion(&mut self) -> bool {
        self.phantom_sweep_count += 1;
        self.phantom_sweep_count >= 2
    }

    pub fn clear_phantom_suspicion(&mut self) {
        self.phantom_sweep_count = 0;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
