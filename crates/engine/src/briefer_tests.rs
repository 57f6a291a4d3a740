// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use orc_adapters::{FakeSessionAdapter, SessionTarget};
use orc_core::clock::FakeClock;
use orc_core::ids::Role;
use orc_core::project::Plan;
use orc_runbook::default_team;

use super::*;
use crate::config::MessengerConfig;
use crate::worktree::Workspace;

fn fast_messenger(session: FakeSessionAdapter) -> TmuxMessenger<FakeSessionAdapter, FakeClock> {
    let config = MessengerConfig { verify_delay: Duration::ZERO, ..MessengerConfig::default() };
    TmuxMessenger::new(session, FakeClock::default(), config)
}

fn assignment(session_name: &str, window: u32, role: &str) -> RoleAssignment {
    RoleAssignment {
        workspace: Workspace { path: PathBuf::from(format!("/work/{role}")), branch: format!("main-{role}"), detached: false },
        target: SessionTarget::new(session_name, window),
    }
}

#[tokio::test]
async fn briefs_a_single_role_and_the_prompt_is_visible_in_the_pane() {
    let session = FakeSessionAdapter::new();
    session.create_session("proj", std::path::Path::new("/work/developer")).await.unwrap();
    let target = SessionTarget::new("proj", 1);
    session.set_pane_content(&target, vec!["$ ".to_string()]);

    let briefer = AgentBriefer::new(fast_messenger(session.clone()));
    let team = default_team(Plan::Pro);
    let role: Role = "developer".into();
    let assignment = assignment("proj", 1, "developer");

    briefer.brief_role("widgets", &team, &role, &assignment, 15).await.unwrap();

    let sent = session
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            orc_adapters::SessionCall::SendLiteral { text, .. } => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    assert!(sent.contains("Developer"), "{sent}");
    assert!(sent.contains("main-developer"), "{sent}");
}

#[tokio::test]
async fn brief_team_stops_at_the_first_missing_assignment() {
    let session = FakeSessionAdapter::new();
    let briefer = AgentBriefer::new(fast_messenger(session));
    let team = default_team(Plan::Pro);
    let assignments: HashMap<Role, RoleAssignment> = HashMap::new();

    let err = briefer.brief_team("widgets", &team, &assignments, 15).await.unwrap_err();
    assert!(matches!(err, BrieferError::MissingAssignment(_)));
}

#[tokio::test]
async fn brief_team_briefs_every_role_in_window_order() {
    let session = FakeSessionAdapter::new();
    session.create_session("proj", std::path::Path::new("/work")).await.unwrap();
    let team = default_team(Plan::Pro);
    let mut assignments = HashMap::new();
    for (idx, role) in team.roles.keys().enumerate() {
        let target = SessionTarget::new("proj", idx as u32);
        session.set_pane_content(&target, vec!["$ ".to_string()]);
        assignments.insert(role.clone(), assignment("proj", idx as u32, role.as_str()));
    }

    let briefer = AgentBriefer::new(fast_messenger(session.clone()));
    briefer.brief_team("widgets", &team, &assignments, 15).await.unwrap();

    let literal_count = session.calls().iter().filter(|c| matches!(c, orc_adapters::SessionCall::SendLiteral { .. })).count();
    assert_eq!(literal_count, team.len());
}
