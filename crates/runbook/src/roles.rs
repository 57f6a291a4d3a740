// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The team: an ordered table of roles, each carrying the title and
//! responsibilities text the briefer renders into an agent's window.

use indexmap::IndexMap;
use orc_core::ids::Role;
use orc_core::project::Plan;
use serde::{Deserialize, Serialize};

/// A single role's static description, independent of any particular
/// project's worktree/branch (those are filled in at briefing time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDef {
    pub title: String,
    pub responsibilities: Vec<String>,
    /// Window index within the tmux session; assigned by team order,
    /// orchestrator always first (window 0).
    pub window_index: u32,
}

/// An ordered team: iteration order is window-assignment order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub roles: IndexMap<Role, RoleDef>,
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: impl Into<Role>, title: impl Into<String>, responsibilities: Vec<String>) {
        let window_index = self.roles.len() as u32;
        self.roles.insert(role.into(), RoleDef { title: title.into(), responsibilities, window_index });
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, role: &Role) -> Option<&RoleDef> {
        self.roles.get(role)
    }

    /// Every role other than `role` itself, in window order — the peer
    /// roster the briefer lists (spec.md §4.5).
    pub fn peers_of<'a>(&'a self, role: &'a Role) -> impl Iterator<Item = (&'a Role, &'a RoleDef)> {
        self.roles.iter().filter(move |(r, _)| *r != role)
    }
}

pub(crate) fn description(role_name: &str) -> (String, Vec<&'static str>) {
    let (title, responsibilities): (&'static str, Vec<&'static str>) = match role_name {
        "orchestrator" => (
            "Orchestrator",
            vec![
                "Own the overall plan and keep every role moving toward the spec",
                "Resolve cross-role blockers escalated by the project-manager",
                "Decide when the project is done and write the COMPLETED marker",
            ],
        ),
        "project-manager" => (
            "Project Manager",
            vec![
                "Hub for all peer communication (hub-and-spoke topology)",
                "Break the spec into assignable units of work for developer/tester/etc.",
                "Aggregate status upward to the orchestrator on each check-in",
            ],
        ),
        "developer" => (
            "Developer",
            vec![
                "Implement the units of work assigned by the project-manager",
                "Commit at least every 30 minutes on the role's branch",
                "Report blockers to the project-manager, never directly to peers",
            ],
        ),
        "tester" => (
            "Tester",
            vec![
                "Write and maintain automated tests for completed work",
                "Flag regressions to the project-manager with repro steps",
            ],
        ),
        "testrunner" => (
            "Test Runner",
            vec![
                "Run the full test suite on a cadence and after every merge",
                "Report failures to the project-manager with the failing output",
            ],
        ),
        "devops" => (
            "DevOps",
            vec![
                "Own CI/CD, build, and deployment configuration",
                "Keep the project's infrastructure-as-code in sync with the plan",
            ],
        ),
        "sysadmin" => (
            "Sysadmin",
            vec!["Manage host-level dependencies and environment provisioning"],
        ),
        "securityops" => (
            "SecurityOps",
            vec![
                "Review changes for security regressions before merge",
                "Escalate findings to the project-manager with severity and remediation",
            ],
        ),
        _ => (
            "",
            vec!["Carry out the responsibilities described in the project specification"],
        ),
    };

    if !title.is_empty() {
        return (title.to_string(), responsibilities);
    }

    // Unknown role name: title-case it rather than leaving a canned label.
    let mut chars = role_name.chars();
    let titled = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    (titled, responsibilities)
}

/// Builds the default team for a plan tier (spec.md §4.6 step 2), used
/// when the specification text names no roles of its own.
pub fn default_team(plan: Plan) -> Team {
    let mut team = Team::new();
    for name in plan.default_roles() {
        let (title, responsibilities) = description(name);
        team.push(*name, title, responsibilities.into_iter().map(str::to_string).collect());
    }
    team
}

#[cfg(test)]
#[path = "roles_tests.rs"]
mod tests;
