// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_messages_name_the_offending_role_or_binary() {
    let err = AgentCliError::BinaryNotFound("claude".to_string());
    assert!(err.to_string().contains("claude"));
    let err = AgentCliError::NoCommandForRole("securityops".to_string());
    assert!(err.to_string().contains("securityops"));
}
