// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_team_pro_has_three_roles_with_orchestrator_first() {
    let team = default_team(Plan::Pro);
    assert_eq!(team.len(), 3);
    let first = team.roles.get_index(0).expect("at least one role");
    assert_eq!(first.0.as_str(), "orchestrator");
    assert_eq!(first.1.window_index, 0);
}

#[test]
fn default_team_max20_has_eight_roles() {
    let team = default_team(Plan::Max20);
    assert_eq!(team.len(), 8);
    for (i, (_, def)) in team.roles.iter().enumerate() {
        assert_eq!(def.window_index, i as u32);
    }
}

#[test]
fn peers_of_excludes_self() {
    let team = default_team(Plan::Max5);
    let role = Role::new("developer");
    let peers: Vec<_> = team.peers_of(&role).map(|(r, _)| r.as_str().to_string()).collect();
    assert!(!peers.contains(&"developer".to_string()));
    assert_eq!(peers.len(), team.len() - 1);
}

#[test]
fn unknown_role_name_gets_title_cased_default_description() {
    let (title, resp) = description("securityresearcher");
    assert_eq!(title, "Securityresearcher");
    assert_eq!(resp.len(), 1);
}
