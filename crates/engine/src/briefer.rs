// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent Briefer (spec.md §4.5, component C5): renders the fixed
//! per-role briefing template and sends it through the messenger. The
//! lifecycle engine is responsible for waiting for each window's ready
//! indicator before calling here (spec.md §4.6 step 6/7) — this module
//! only composes and delivers.

use std::collections::HashMap;

use thiserror::Error;

use orc_adapters::{SessionAdapter, SessionTarget};
use orc_core::clock::Clock;
use orc_core::ids::Role;
use orc_runbook::{compose_briefing, BriefingContext, RunbookError, Team};

use crate::messenger::{MessengerError, TmuxMessenger};
use crate::worktree::Workspace;

#[derive(Debug, Error)]
pub enum BrieferError {
    #[error("runbook error: {0}")]
    Runbook(#[from] RunbookError),
    #[error("messenger error: {0}")]
    Messenger(#[from] MessengerError),
    #[error("no worktree assignment for role '{0}'")]
    MissingAssignment(String),
}

/// Where a role's briefed window lives, handed in by the lifecycle engine
/// once that role's worktree and tmux window both exist.
#[derive(Debug, Clone)]
pub struct RoleAssignment {
    pub workspace: Workspace,
    pub target: SessionTarget,
}

pub struct AgentBriefer<S: SessionAdapter, C: Clock> {
    messenger: TmuxMessenger<S, C>,
}

impl<S: SessionAdapter, C: Clock> AgentBriefer<S, C> {
    pub fn new(messenger: TmuxMessenger<S, C>) -> Self {
        Self { messenger }
    }

    /// Composes and delivers the briefing for a single role.
    pub async fn brief_role(
        &self,
        project_name: &str,
        team: &Team,
        role: &Role,
        assignment: &RoleAssignment,
        check_in_interval_minutes: u32,
    ) -> Result<(), BrieferError> {
        let ctx = BriefingContext {
            role: role.clone(),
            worktree: assignment.workspace.path.clone(),
            branch: assignment.workspace.branch.clone(),
            check_in_interval_minutes,
            project_name: project_name.to_string(),
        };
        let text = compose_briefing(&ctx, team)?;
        self.messenger.send(None, &assignment.target, &text).await?;
        Ok(())
    }

    /// Briefs every role on the team, in window order, stopping at the
    /// first failure so the lifecycle engine's compensating path
    /// (spec.md §4.6) sees a precise `failed_components` cause.
    pub async fn brief_team(
        &self,
        project_name: &str,
        team: &Team,
        assignments: &HashMap<Role, RoleAssignment>,
        check_in_interval_minutes: u32,
    ) -> Result<(), BrieferError> {
        for role in team.roles.keys() {
            let assignment = assignments
                .get(role)
                .ok_or_else(|| BrieferError::MissingAssignment(role.as_str().to_string()))?;
            self.brief_role(project_name, team, role, assignment, check_in_interval_minutes).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "briefer_tests.rs"]
mod tests;
