// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Completion & Failure Handler (spec.md §4.10, component C10): the
//! one path a project's PROCESSING lifecycle ever exits through, whether
//! it got there by finishing the work or by running out of road. Failure
//! and completion share `close_project` — an emergency alert before any
//! destructive action, a Markdown report under the project registry, a
//! `FailureRecord` on the failure path, and a status transition that
//! frees the single PROCESSING slot for the queue's next tick.

use std::path::PathBuf;

use thiserror::Error;

use orc_adapters::{NotifyAdapter, NotifyKind, SessionAdapter, SessionError, SessionTarget};
use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::failure::FailureReason;
use orc_core::id::IdGen;
use orc_core::ids::{FailureId, ProjectId};
use orc_core::project::{Project, ProjectStatus};
use orc_core::session::WaitingFor;
use orc_storage::{Store, StoreError};

use crate::config::CompletionConfig;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("project {0} not found")]
    ProjectNotFound(String),
}

/// Why a project is being closed, and which of the two paths to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Completed,
    Failed { reason: FailureReason },
}

pub struct CompletionHandler<S: SessionAdapter, N: NotifyAdapter, C: Clock, I: IdGen> {
    session: S,
    notify: N,
    clock: C,
    id_gen: I,
    /// Installation root reports and the failure journal are persisted
    /// under (spec.md:256) — never the project's own working copy.
    state_dir: PathBuf,
    config: CompletionConfig,
}

impl<S: SessionAdapter, N: NotifyAdapter, C: Clock, I: IdGen> CompletionHandler<S, N, C, I> {
    pub fn new(session: S, notify: N, clock: C, id_gen: I, state_dir: PathBuf, config: CompletionConfig) -> Self {
        Self { session, notify, clock, id_gen, state_dir, config }
    }

    /// Closes a PROCESSING project. Emits the emergency notification
    /// first, then writes the report, then transitions status — in that
    /// order, so a report always exists for whatever the alert announced.
    /// The failure path force-kills the session immediately; the
    /// completion path leaves it for `reap_expired` to collect once the
    /// operator-attach grace window elapses.
    pub async fn close_project(
        &self,
        store: &mut Store,
        project_id: &ProjectId,
        outcome: CloseOutcome,
        detail: String,
    ) -> Result<PathBuf, CompletionError> {
        let project = store.state.projects.get(project_id).cloned().ok_or_else(|| CompletionError::ProjectNotFound(project_id.to_string()))?;
        let now = self.clock.epoch_secs();

        let (kind, subject) = match &outcome {
            CloseOutcome::Completed => (NotifyKind::ProjectCompleted, format!("Project {project_id} completed")),
            CloseOutcome::Failed { reason } => (NotifyKind::ProjectFailed, format!("Project {project_id} failed: {reason:?}")),
        };
        if let Err(e) = self.notify.notify(kind, &subject, &detail, &[]).await {
            tracing::error!(project = %project_id, error = %e, "close-project notification failed, continuing");
        }

        let report_path = self.write_report(store, &project, &outcome, &detail, now).await?;

        if let Some(session_name) = &project.main_session {
            if let Some(session_state) = store.state.sessions.get(session_name).cloned() {
                for role in session_state.agents.keys() {
                    store.append(Event::SessionAgentActivity {
                        session_name: session_name.clone(),
                        role: role.clone(),
                        at: now,
                        waiting_for: WaitingFor::Nothing,
                    })?;
                }
            }
        }

        match &outcome {
            CloseOutcome::Completed => {
                store.state.transition_project(project_id, ProjectStatus::Completed)?;
                store.append(Event::ProjectStatusChanged {
                    project_id: project_id.clone(),
                    from: project.status,
                    to: ProjectStatus::Completed,
                    at: now,
                    error_message: None,
                    failed_components: Vec::new(),
                })?;
                if self.config.operator_attach_grace.is_zero() {
                    if let Some(session_name) = &project.main_session {
                        self.force_kill(session_name.as_str()).await;
                    }
                }
            }
            CloseOutcome::Failed { reason } => {
                store.state.transition_project(project_id, ProjectStatus::Failed)?;
                store.append(Event::ProjectStatusChanged {
                    project_id: project_id.clone(),
                    from: project.status,
                    to: ProjectStatus::Failed,
                    at: now,
                    error_message: Some(detail.clone()),
                    failed_components: Vec::new(),
                })?;
                let duration_hours = project.started_at.map(|started| (now - started) as f64 / 3600.0).unwrap_or(0.0);
                let agent_count = project.main_session.as_ref().and_then(|s| store.state.sessions.get(s)).map(|s| s.agents.len()).unwrap_or(0);
                store.append(Event::FailureRecorded {
                    failure_id: FailureId::new(self.id_gen.next()),
                    project_id: project_id.clone(),
                    session_name: project.main_session.clone(),
                    reason: *reason,
                    detail,
                    failed_components: Vec::new(),
                    occurred_at: now,
                    duration_hours,
                    spec_path: project.spec_path.clone(),
                    agent_count,
                    report_path: Some(report_path.clone()),
                })?;
                if let Some(record) = store.state.failures.last() {
                    self.append_failure_journal(record);
                }
                if let Some(session_name) = &project.main_session {
                    self.force_kill(session_name.as_str()).await;
                }
            }
        }

        Ok(report_path)
    }

    /// Kills any COMPLETED project's session whose operator-attach grace
    /// window has elapsed. Intended to be driven by the same periodic tick
    /// that drives the Health Monitor's sweep.
    pub async fn reap_expired(&self, store: &Store) -> Result<Vec<ProjectId>, CompletionError> {
        let now = self.clock.epoch_secs();
        let mut reaped = Vec::new();
        for project in store.state.projects.values() {
            if project.status != ProjectStatus::Completed {
                continue;
            }
            let Some(completed_at) = project.completed_at else { continue };
            if now - completed_at < self.config.operator_attach_grace.as_secs() as i64 {
                continue;
            }
            let Some(session_name) = &project.main_session else { continue };
            if self.session.session_exists(session_name.as_str()).await? {
                self.force_kill(session_name.as_str()).await;
                reaped.push(project.id.clone());
            }
        }
        Ok(reaped)
    }

    async fn force_kill(&self, session_name: &str) {
        if let Err(e) = self.session.kill_session(session_name, true).await {
            tracing::warn!(session = %session_name, error = %e, "failed to kill session during close_project");
        }
    }

    /// Markdown report: identity, reason, duration, last
    /// `report_scrollback_lines` per window, per-agent status, and a short
    /// recommendations section — persisted under
    /// `{state_dir}/{registry_dir}/{project_id}.md`.
    async fn write_report(&self, store: &Store, project: &Project, outcome: &CloseOutcome, detail: &str, now: i64) -> Result<PathBuf, CompletionError> {
        let mut body = String::new();
        let title = match outcome {
            CloseOutcome::Completed => "Completion report",
            CloseOutcome::Failed { .. } => "Failure report",
        };
        body.push_str(&format!("# {title}: {}\n\n", project.id));
        body.push_str(&format!("- status: {:?}\n", outcome));
        body.push_str(&format!("- spec: {}\n", project.spec_path.display()));
        body.push_str(&format!("- project path: {}\n", project.project_path.display()));
        body.push_str(&format!("- plan: {:?}\n", project.plan));
        body.push_str(&format!("- attempts: {}\n", project.attempts));
        if let Some(started_at) = project.started_at {
            body.push_str(&format!("- duration: {}s\n", now - started_at));
        }
        body.push_str(&format!("- detail: {detail}\n\n"));

        if let Some(session_name) = &project.main_session {
            if let Some(session_state) = store.state.sessions.get(session_name) {
                body.push_str("## Agents\n\n");
                for (role, agent) in &session_state.agents {
                    body.push_str(&format!("### {role} (window {})\n\n", agent.window_index));
                    body.push_str(&format!("- waiting_for: {:?}\n", agent.waiting_for));
                    body.push_str(&format!("- recovery_attempts: {}\n", agent.recovery_attempts));
                    body.push_str(&format!("- last_activity: {}s ago\n\n", now - agent.last_activity_epoch));

                    let target = SessionTarget::new(session_name.as_str(), agent.window_index);
                    match self.session.capture_pane(&target, self.config.report_scrollback_lines).await {
                        Ok(pane) => {
                            body.push_str("```\n");
                            body.push_str(&pane);
                            body.push_str("\n```\n\n");
                        }
                        Err(e) => body.push_str(&format!("(pane capture failed: {e})\n\n")),
                    }
                }
            }
        }

        body.push_str("## Recommendations\n\n");
        match outcome {
            CloseOutcome::Completed => body.push_str("- Review the merge once the auto-merge runner's next tick picks this project up.\n"),
            CloseOutcome::Failed { reason } => {
                body.push_str(&format!("- Investigate the {reason:?} failure above before re-queuing with `queue --reset`.\n"))
            }
        }

        let dir = self.state_dir.join(&self.config.registry_dir);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.md", project.id));
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }

    /// Appends `record` as one JSON line under
    /// `{state_dir}/{registry_dir}/logs/failures.jsonl`, mirroring every
    /// `FailureRecord` for external consumers (spec.md:256). Best-effort,
    /// same as `TmuxMessenger::journal` — a failure here must never block
    /// the project from actually closing out.
    fn append_failure_journal(&self, record: &orc_core::failure::FailureRecord) {
        let dir = self.state_dir.join(&self.config.registry_dir).join("logs");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(error = %e, "could not create failure journal directory");
            return;
        }
        let path = dir.join("failures.jsonl");
        let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
            tracing::warn!(path = %path.display(), "could not open failure journal");
            return;
        };
        if let Ok(line) = serde_json::to_string(record) {
            use std::io::Write;
            let _ = writeln!(file, "{line}");
        }
    }
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
