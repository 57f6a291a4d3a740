// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FailureRecord: an append-only log of why a project stopped (spec §4.1,
//! §4.10). Never mutated after insertion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ids::{FailureId, ProjectId, SessionName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    ProvisioningFailed,
    HealthTimeout,
    StuckAgentUnrecovered,
    OperatorAbort,
    MergeFailed,
}

/// Append-only record of why a project stopped (spec.md:65-66). `session_name`
/// and `report_path` are `None` when a project fails before a session is ever
/// created (e.g. a preflight check), since there is nothing to point at yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: FailureId,
    pub project_id: ProjectId,
    pub session_name: Option<SessionName>,
    pub reason: FailureReason,
    pub detail: String,
    pub failed_components: Vec<String>,
    pub occurred_at: i64,
    pub duration_hours: f64,
    pub spec_path: PathBuf,
    pub agent_count: usize,
    pub report_path: Option<PathBuf>,
}

impl FailureRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FailureId,
        project_id: ProjectId,
        session_name: Option<SessionName>,
        reason: FailureReason,
        detail: String,
        failed_components: Vec<String>,
        occurred_at: i64,
        duration_hours: f64,
        spec_path: PathBuf,
        agent_count: usize,
        report_path: Option<PathBuf>,
    ) -> Self {
        Self {
            id,
            project_id,
            session_name,
            reason,
            detail,
            failed_components,
            occurred_at,
            duration_hours,
            spec_path,
            agent_count,
            report_path,
        }
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
