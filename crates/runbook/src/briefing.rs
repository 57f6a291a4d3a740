// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composes the fixed role-briefing template spec.md §4.5 describes: role
//! title, responsibilities, working directory, branch, peer roster with
//! window indices, check-in cadence, hub-and-spoke communication protocol,
//! git discipline, and recovery instructions.

use std::collections::BTreeMap;
use std::path::Path;

use orc_core::ids::Role;

use crate::error::RunbookError;
use crate::roles::Team;
use crate::template::interpolate;

/// A peer role as seen from the briefed agent's perspective.
#[derive(Debug, Clone)]
pub struct PeerRef {
    pub role: String,
    pub title: String,
    pub window_index: u32,
}

/// Everything [`compose_briefing`] needs about the project/role pairing —
/// deliberately a plain data struct (no lazily-resolved collaborator),
/// matching spec.md §9's anti-global-state guidance.
#[derive(Debug, Clone)]
pub struct BriefingContext {
    pub role: Role,
    pub worktree: std::path::PathBuf,
    pub branch: String,
    pub check_in_interval_minutes: u32,
    pub project_name: String,
}

const TEMPLATE: &str = "\
# Briefing — ${title}

You are the **${title}** for project `${project_name}`.

## Responsibilities
${responsibilities}

## Working directory
Branch `${branch}`, worktree `${worktree}`.

## Team
${peers}

## Communication protocol
Hub-and-spoke: talk only to the project-manager. The project-manager
aggregates status upward to the orchestrator; do not message peer roles
directly unless you are the project-manager or orchestrator.

## Check-ins
Expect a status check-in roughly every ${check_in_interval} minutes. Reply
with:
  STATUS ${role} <iso-timestamp>
  Completed: ...
  Current: ...
  Blocked: ...
  ETA: ...

## Git discipline
Commit on your own branch at least every 30 minutes. Never force-push over
a peer's branch. Merges back to the project's starting branch are handled
by the orchestrator's auto-merge pipeline, not by you.

## Recovery
If you lose context or are restarted, resume from your branch's last
commit and your most recent status check-in rather than starting over.
";

fn render_peers(team: &Team, role: &Role) -> String {
    let mut lines = Vec::new();
    for (peer_role, def) in team.peers_of(role) {
        lines.push(format!("- window {}: {} ({})", def.window_index, def.title, peer_role.as_str()));
    }
    if lines.is_empty() {
        "(no peers on this team)".to_string()
    } else {
        lines.join("\n")
    }
}

fn render_responsibilities(responsibilities: &[String]) -> String {
    responsibilities.iter().map(|r| format!("- {r}")).collect::<Vec<_>>().join("\n")
}

/// Renders the briefing for `ctx.role`, given the full `team` (for the peer
/// roster) and the role's own static description.
pub fn compose_briefing(ctx: &BriefingContext, team: &Team) -> Result<String, RunbookError> {
    let def = team
        .get(&ctx.role)
        .ok_or_else(|| RunbookError::RoleNotOnTeam { role: ctx.role.as_str().to_string() })?;

    let mut vars = BTreeMap::new();
    vars.insert("title".to_string(), def.title.clone());
    vars.insert("project_name".to_string(), ctx.project_name.clone());
    vars.insert("responsibilities".to_string(), render_responsibilities(&def.responsibilities));
    vars.insert("branch".to_string(), ctx.branch.clone());
    vars.insert("worktree".to_string(), path_display(&ctx.worktree));
    vars.insert("peers".to_string(), render_peers(team, &ctx.role));
    vars.insert("check_in_interval".to_string(), ctx.check_in_interval_minutes.to_string());
    vars.insert("role".to_string(), ctx.role.as_str().to_string());

    Ok(interpolate(TEMPLATE, &vars))
}

fn path_display(p: &Path) -> String {
    p.display().to_string()
}

#[cfg(test)]
#[path = "briefing_tests.rs"]
mod tests;
