// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory agent CLI adapter for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use orc_core::ids::Role;
use parking_lot::Mutex;

use super::{AgentCliAdapter, AgentCliError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCliCall {
    CheckPrecondition,
    LaunchCommand { role: String },
}

#[derive(Default)]
struct FakeAgentCliState {
    calls: Vec<AgentCliCall>,
    precondition_failure: Option<String>,
    commands: std::collections::HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct FakeAgentCliAdapter {
    inner: Arc<Mutex<FakeAgentCliState>>,
}

impl FakeAgentCliAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AgentCliCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_precondition(&self, reason: &str) {
        self.inner.lock().precondition_failure = Some(reason.to_string());
    }

    pub fn set_command(&self, role: &str, command: &str) {
        self.inner.lock().commands.insert(role.to_string(), command.to_string());
    }
}

#[async_trait]
impl AgentCliAdapter for FakeAgentCliAdapter {
    async fn check_precondition(&self) -> Result<(), AgentCliError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCliCall::CheckPrecondition);
        match &inner.precondition_failure {
            Some(reason) => Err(AgentCliError::NotAuthenticated(reason.clone())),
            None => Ok(()),
        }
    }

    fn launch_command(&self, role: &Role) -> Result<String, AgentCliError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCliCall::LaunchCommand { role: role.as_str().to_string() });
        inner
            .commands
            .get(role.as_str())
            .cloned()
            .ok_or_else(|| AgentCliError::NoCommandForRole(role.as_str().to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
