// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent CLI adapter (spec.md §9's `AgentCLI` interface): this system never
//! drives the coding agent's process directly — it only (a) checks the
//! launch precondition (binary present, already authenticated) before
//! provisioning a role's window, and (b) resolves the literal command line
//! the Session Controller types into that window. Everything after launch
//! is observed through the tmux pane, not this adapter.

mod config_file;

pub use config_file::{AgentCliConfig, ConfigFileAgentCli};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCliCall, FakeAgentCliAdapter};

use async_trait::async_trait;
use orc_core::ids::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentCliError {
    #[error("agent CLI binary not found: {0}")]
    BinaryNotFound(String),
    #[error("agent CLI not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("no command configured for role {0:?}")]
    NoCommandForRole(String),
}

/// Adapter for the coding agent's command-line tool. Spec.md §1 explicitly
/// excludes automating authentication — `check_precondition` only detects
/// and reports the failure so provisioning can abort fast rather than spawn
/// a window that immediately demands a login flow.
#[async_trait]
pub trait AgentCliAdapter: Clone + Send + Sync + 'static {
    /// Verifies the CLI is installed and already authenticated. Called once
    /// per project before any window is created (spec.md §6's exit code 3,
    /// "precondition failed", traces back to this check).
    async fn check_precondition(&self) -> Result<(), AgentCliError>;

    /// The literal text the Session Controller sends into a freshly created
    /// window to start the agent for `role`.
    fn launch_command(&self, role: &Role) -> Result<String, AgentCliError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
