// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orc_core::ids::Role;
use orc_shell::{safe_run, RetryPolicy, ShellError};
use serde::{Deserialize, Serialize};

use super::{AgentCliAdapter, AgentCliError};

const PRECONDITION_TIMEOUT: Duration = Duration::from_secs(10);

/// On-disk configuration for the agent CLI: which binary to launch, how to
/// probe it for the precondition check, and the literal command line per
/// role (falling back to `default_command` when a role has no override).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCliConfig {
    pub binary: String,
    #[serde(default = "default_version_flag")]
    pub version_flag: String,
    pub default_command: Option<String>,
    #[serde(default)]
    pub role_commands: HashMap<String, String>,
}

fn default_version_flag() -> String {
    "--version".to_string()
}

#[derive(Clone)]
pub struct ConfigFileAgentCli {
    config: Arc<AgentCliConfig>,
}

impl ConfigFileAgentCli {
    pub fn new(config: AgentCliConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        Ok(Self::new(toml::from_str(contents)?))
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map(Self::new)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[async_trait]
impl AgentCliAdapter for ConfigFileAgentCli {
    async fn check_precondition(&self) -> Result<(), AgentCliError> {
        let result = safe_run(
            &self.config.binary,
            &[self.config.version_flag.as_str()],
            None,
            PRECONDITION_TIMEOUT,
            RetryPolicy::NONE,
            "agent CLI precondition check",
        )
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(ShellError::NonZeroExit { stderr, .. }) if stderr.to_lowercase().contains("auth") => {
                Err(AgentCliError::NotAuthenticated(stderr))
            }
            Err(_) => Err(AgentCliError::BinaryNotFound(self.config.binary.clone())),
        }
    }

    fn launch_command(&self, role: &Role) -> Result<String, AgentCliError> {
        if let Some(cmd) = self.config.role_commands.get(role.as_str()) {
            return Ok(cmd.clone());
        }
        self.config
            .default_command
            .clone()
            .ok_or_else(|| AgentCliError::NoCommandForRole(role.as_str().to_string()))
    }
}

#[cfg(test)]
#[path = "config_file_tests.rs"]
mod tests;
