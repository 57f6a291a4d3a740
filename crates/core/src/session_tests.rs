// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;

#[test]
fn agent_idle_detection_respects_threshold() {
    let agent = AgentState::new(
        Role::new("developer"),
        1,
        PathBuf::from("/work/widget-tmux-worktrees/developer"),
        "feature/developer".into(),
        1000,
    );
    assert!(!agent.is_idle_for(1500, 600));
    assert!(agent.is_idle_for(2000, 600));
}

#[test]
fn phantom_suspicion_requires_two_consecutive_sweeps() {
    let mut session = SessionState::new(
        ProjectId::new("proj-1"),
        SessionName::new("spec-widget"),
        "main".into(),
        0,
    );
    assert!(!session.record_phantom_suspicion());
    assert!(session.record_phantom_suspicion());
}

#[test]
fn clearing_phantom_suspicion_resets_the_counter() {
    let mut session = SessionState::new(
        ProjectId::new("proj-1"),
        SessionName::new("spec-widget"),
        "main".into(),
        0,
    );
    session.record_phantom_suspicion();
    session.clear_phantom_suspicion();
    assert_eq!(session.phantom_sweep_count, 0);
}

#[test]
fn add_agent_is_keyed_by_role() {
    let mut session = SessionState::new(
        ProjectId::new("proj-1"),
        SessionName::new("spec-widget"),
        "main".into(),
        0,
    );
    session.add_agent(AgentState::new(
        Role::new("developer"),
        1,
        PathBuf::from("/w/dev"),
        "feature/developer".into(),
        0,
    ));
    assert!(session.agents.contains_key("developer"));
}
