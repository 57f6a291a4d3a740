// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn check_precondition_defaults_to_success() {
    let adapter = FakeAgentCliAdapter::new();
    adapter.check_precondition().await.unwrap();
}

#[tokio::test]
async fn fail_precondition_surfaces_not_authenticated() {
    let adapter = FakeAgentCliAdapter::new();
    adapter.fail_precondition("no active session");
    let err = adapter.check_precondition().await.unwrap_err();
    assert!(matches!(err, AgentCliError::NotAuthenticated(ref reason) if reason == "no active session"));
}

#[test]
fn launch_command_uses_the_configured_override() {
    let adapter = FakeAgentCliAdapter::new();
    adapter.set_command("developer", "claude --role developer");
    assert_eq!(adapter.launch_command(&Role::new("developer")).unwrap(), "claude --role developer");
    assert!(matches!(adapter.calls()[0], AgentCliCall::LaunchCommand { .. }));
}

#[test]
fn launch_command_without_a_configured_command_errors() {
    let adapter = FakeAgentCliAdapter::new();
    let err = adapter.launch_command(&Role::new("tester")).unwrap_err();
    assert!(matches!(err, AgentCliError::NoCommandForRole(_)));
}
