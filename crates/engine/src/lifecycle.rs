// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Lifecycle Engine (spec.md §4.6, component C6): end-to-end
//! provisioning of a dequeued project, steps 1-10. Any step's failure
//! triggers the compensating path — kill the session, release empty
//! worktrees, mark the project FAILED with a component breakdown, and
//! re-enqueue if attempts remain.

use std::collections::HashMap;

use thiserror::Error;

use orc_adapters::{AgentCliAdapter, AgentCliError, GitAdapter, GitError, SessionAdapter, SessionError, SessionTarget};
use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::failure::FailureReason;
use orc_core::id::IdGen;
use orc_core::ids::{ProjectId, Role, SessionName};
use orc_core::project::{Project, ProjectStatus};
use orc_runbook::{default_team, extract_team, Team};
use orc_storage::{Store, StoreError};

use crate::briefer::{AgentBriefer, BrieferError, RoleAssignment};
use crate::config::LifecycleConfig;
use crate::scheduler::Scheduler;
use crate::worktree::{Workspace, WorktreeError, WorktreeManager};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("git error: {0}")]
    Git(#[from] GitError),
    #[error("worktree provisioning failed: {0}")]
    Worktree(#[from] WorktreeError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("agent CLI precondition failed: {0}")]
    AgentCli(#[from] AgentCliError),
    #[error("briefer error: {0}")]
    Briefer(#[from] BrieferError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("project {0} not found")]
    ProjectNotFound(String),
    #[error("ready indicator for role '{role}' never appeared within the timeout")]
    ReadinessTimeout { role: String },
}

/// Which step of provisioning failed, for the `failed_components` tag on
/// the resulting FAILED transition.
const COMPONENT_PREFLIGHT: &str = "agent_cli_preflight";
const COMPONENT_WORKTREE: &str = "worktree_manager";
const COMPONENT_SESSION: &str = "session_controller";
const COMPONENT_READINESS: &str = "readiness_wait";
const COMPONENT_BRIEFER: &str = "agent_briefer";

pub struct LifecycleEngine<G: GitAdapter, S: SessionAdapter, A: AgentCliAdapter, C: Clock, I: IdGen> {
    git: G,
    worktree: WorktreeManager<G>,
    session: S,
    agent_cli: A,
    briefer: AgentBriefer<S, C>,
    scheduler: Scheduler<S, C, I>,
    clock: C,
    id_gen: I,
    config: LifecycleConfig,
}

impl<G: GitAdapter, S: SessionAdapter, A: AgentCliAdapter, C: Clock, I: IdGen> LifecycleEngine<G, S, A, C, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        git: G,
        worktree: WorktreeManager<G>,
        session: S,
        agent_cli: A,
        briefer: AgentBriefer<S, C>,
        scheduler: Scheduler<S, C, I>,
        clock: C,
        id_gen: I,
        config: LifecycleConfig,
    ) -> Self {
        Self { git, worktree, session, agent_cli, briefer, scheduler, clock, id_gen, config }
    }

    /// Runs steps 1-10 of spec.md §4.6 against a QUEUED project, leaving it
    /// PROCESSING on success or FAILED (and possibly re-enqueued) on any
    /// step's failure.
    pub async fn provision(&self, store: &mut Store, project_id: &ProjectId, spec_text: &str) -> Result<(), LifecycleError> {
        let project = store
            .state
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| LifecycleError::ProjectNotFound(project_id.to_string()))?;
        let now = self.clock.epoch_secs();

        store.state.transition_project(project_id, ProjectStatus::Processing)?;
        store.append(Event::ProjectStatusChanged {
            project_id: project_id.clone(),
            from: project.status,
            to: ProjectStatus::Processing,
            at: now,
            error_message: None,
            failed_components: Vec::new(),
        })?;

        if let Err(e) = self.agent_cli.check_precondition().await {
            return self.fail(store, project_id, vec![COMPONENT_PREFLIGHT.to_string()], e.to_string()).await.and(Err(e.into()));
        }

        let team = extract_team(spec_text, project.plan);
        let team = if team.is_empty() { default_team(project.plan) } else { team };

        let starting_branch = match self.git.current_branch(&project.project_path).await {
            Ok(branch) => branch,
            Err(e) => {
                return self.fail(store, project_id, vec![COMPONENT_WORKTREE.to_string()], e.to_string()).await.and(Err(e.into()));
            }
        };

        let session_stem = project.spec_path.file_stem().and_then(|s| s.to_str()).unwrap_or("project");
        let session_name = SessionName::new(format!("{session_stem}-impl-{}", orc_core::id::short_suffix()));

        // Persisted before the session exists so a crash between here and
        // `create_session` never leaves a live, unregistered session for
        // the Health Monitor's phantom detection to kill (spec.md §4.6
        // step 3's critical ordering note).
        store.append(Event::ProjectSessionAttached { project_id: project_id.clone(), session_name: session_name.clone(), at: now })?;

        let mut assignments: HashMap<Role, RoleAssignment> = HashMap::new();
        for role in team.roles.keys() {
            match self.worktree.provision(&project.project_path, role.as_str(), &starting_branch, false).await {
                Ok(workspace) => {
                    assignments.insert(role.clone(), RoleAssignment { workspace, target: SessionTarget::new(session_name.as_str(), 0) });
                }
                Err(e) => {
                    self.release_provisioned(&project.project_path, &assignments).await;
                    return self.fail(store, project_id, vec![COMPONENT_WORKTREE.to_string()], e.to_string()).await.and(Err(e.into()));
                }
            }
        }

        let primary_worktree = team
            .roles
            .keys()
            .next()
            .and_then(|role| assignments.get(role))
            .map(|a| a.workspace.path.clone())
            .unwrap_or_else(|| project.project_path.clone());
        if let Err(e) = WorktreeManager::<G>::record_starting_branch(&primary_worktree, &starting_branch) {
            tracing::warn!(error = %e, "could not record STARTING_BRANCH sentinel");
        }

        if let Err(e) = self.create_session_and_windows(&session_name, &project.project_path, &team, &mut assignments).await {
            self.compensate_session(&session_name).await;
            self.release_provisioned(&project.project_path, &assignments).await;
            return self.fail(store, project_id, vec![COMPONENT_SESSION.to_string()], e.to_string()).await.and(Err(e.into()));
        }

        if let Err(e) = self.launch_agents(&team, &assignments).await {
            self.compensate_session(&session_name).await;
            self.release_provisioned(&project.project_path, &assignments).await;
            return self.fail(store, project_id, vec![COMPONENT_SESSION.to_string()], e.to_string()).await.and(Err(e.into()));
        }

        if let Err(e) = self.wait_for_ready(&team, &assignments).await {
            self.compensate_session(&session_name).await;
            self.release_provisioned(&project.project_path, &assignments).await;
            return self.fail(store, project_id, vec![COMPONENT_READINESS.to_string()], e.to_string()).await.and(Err(e));
        }

        let check_in_minutes = self.config.check_in_minutes;
        if let Err(e) = self.briefer.brief_team(session_stem, &team, &assignments, check_in_minutes).await {
            self.compensate_session(&session_name).await;
            self.release_provisioned(&project.project_path, &assignments).await;
            return self.fail(store, project_id, vec![COMPONENT_BRIEFER.to_string()], e.to_string()).await.and(Err(e.into()));
        }

        store.append(Event::SessionCreated {
            project_id: project_id.clone(),
            session_name: session_name.clone(),
            starting_branch: starting_branch.clone(),
            created_at: now,
        })?;
        for (role, def) in &team.roles {
            let Some(assignment) = assignments.get(role) else { continue };
            store.append(Event::SessionAgentAdded {
                session_name: session_name.clone(),
                role: role.clone(),
                window_index: def.window_index,
                worktree: assignment.workspace.path.clone(),
                branch: assignment.workspace.branch.clone(),
                at: now,
            })?;
        }

        if let Err(e) = self.schedule_check_ins(store, &session_name, &team, &assignments) {
            tracing::warn!(project = %project_id, error = %e, "failed to schedule initial check-ins");
        }

        Ok(())
    }

    /// spec.md §4.6 step 9: a recurring check-in for every role, routed
    /// through C7 so delivery, backoff, and dedup all go through the
    /// Scheduler rather than this component poking tasks directly. The
    /// orchestrator runs on its own recurring cadence
    /// (`SchedulerConfig::orchestrator_check_in_interval_minutes`) instead
    /// of the team's shared `check_in_minutes`.
    fn schedule_check_ins(
        &self,
        store: &mut Store,
        session_name: &SessionName,
        team: &Team,
        assignments: &HashMap<Role, RoleAssignment>,
    ) -> Result<(), crate::scheduler::SchedulerError> {
        for role in team.roles.keys() {
            let Some(assignment) = assignments.get(role) else { continue };
            if role.as_str() == "orchestrator" {
                self.scheduler.enqueue(
                    store,
                    session_name.as_str(),
                    role,
                    assignment.target.window,
                    self.scheduler.orchestrator_check_in_minutes(),
                    &format!("Self check-in: report STATUS {role} <iso-timestamp> summarizing every role's progress."),
                )?;
            } else {
                self.scheduler.enqueue(
                    store,
                    session_name.as_str(),
                    role,
                    assignment.target.window,
                    self.config.check_in_minutes,
                    &format!("Check-in: report STATUS {role} <iso-timestamp>."),
                )?;
            }
        }
        Ok(())
    }

    async fn create_session_and_windows(
        &self,
        session_name: &SessionName,
        project_path: &std::path::Path,
        team: &Team,
        assignments: &mut HashMap<Role, RoleAssignment>,
    ) -> Result<(), LifecycleError> {
        let mut roles = team.roles.keys();
        let Some(first_role) = roles.next() else { return Ok(()) };
        let first_workspace = assignments.get(first_role).map(|a| a.workspace.path.clone()).unwrap_or_else(|| project_path.to_path_buf());
        self.session.create_session(session_name.as_str(), &first_workspace).await?;
        if let Some(a) = assignments.get_mut(first_role) {
            a.target = SessionTarget::new(session_name.as_str(), 0);
        }

        for role in roles {
            let Some(workspace) = assignments.get(role).map(|a| a.workspace.path.clone()) else { continue };
            let index = self.session.new_window(session_name.as_str(), role.as_str(), &workspace).await?;
            if let Some(a) = assignments.get_mut(role) {
                a.target = SessionTarget::new(session_name.as_str(), index);
            }
        }
        Ok(())
    }

    async fn launch_agents(&self, team: &Team, assignments: &HashMap<Role, RoleAssignment>) -> Result<(), LifecycleError> {
        for role in team.roles.keys() {
            let Some(assignment) = assignments.get(role) else { continue };
            let command = self.agent_cli.launch_command(role)?;
            self.session.send_literal(&assignment.target, &command).await?;
            self.session.send_enter(&assignment.target).await?;
        }
        Ok(())
    }

    async fn wait_for_ready(&self, team: &Team, assignments: &HashMap<Role, RoleAssignment>) -> Result<(), LifecycleError> {
        let poll = self.config.readiness_poll_interval.max(std::time::Duration::from_millis(1));
        let max_polls = (self.config.readiness_timeout.as_millis() / poll.as_millis()).max(1) as u32;

        for role in team.roles.keys() {
            let Some(assignment) = assignments.get(role) else { continue };
            let mut attempt = 0u32;
            loop {
                let pane = self.session.capture_pane(&assignment.target, 50).await?;
                if self.config.ready_indicators.iter().any(|ind| pane.contains(ind.as_str())) {
                    break;
                }
                attempt += 1;
                if attempt >= max_polls {
                    return Err(LifecycleError::ReadinessTimeout { role: role.as_str().to_string() });
                }
                tokio::time::sleep(poll).await;
            }
        }
        Ok(())
    }

    async fn release_provisioned(&self, project_path: &std::path::Path, assignments: &HashMap<Role, RoleAssignment>) {
        for assignment in assignments.values() {
            let _ = self.worktree.release(project_path, &assignment.workspace).await;
        }
    }

    async fn compensate_session(&self, session_name: &SessionName) {
        let _ = self.session.kill_session(session_name.as_str(), true).await;
    }

    /// Marks the project FAILED with the given component tag, increments
    /// `attempts`, and re-enqueues if attempts remain (spec.md §4.6's
    /// compensating path and §4.8's retry cap).
    async fn fail(
        &self,
        store: &mut Store,
        project_id: &ProjectId,
        failed_components: Vec<String>,
        detail: String,
    ) -> Result<(), LifecycleError> {
        let now = self.clock.epoch_secs();
        let Some(project) = store.state.projects.get(project_id).cloned() else {
            return Ok(());
        };
        store.append(Event::ProjectStatusChanged {
            project_id: project_id.clone(),
            from: project.status,
            to: ProjectStatus::Failed,
            at: now,
            error_message: Some(detail.clone()),
            failed_components: failed_components.clone(),
        })?;
        store.append(Event::ProjectAttemptIncremented { project_id: project_id.clone(), attempts: project.attempts + 1 })?;
        let duration_hours = project.started_at.map(|started| (now - started) as f64 / 3600.0).unwrap_or(0.0);
        let agent_count = project.main_session.as_ref().and_then(|s| store.state.sessions.get(s)).map(|s| s.agents.len()).unwrap_or(0);
        store.append(Event::FailureRecorded {
            failure_id: orc_core::ids::FailureId::new(self.id_gen.next()),
            project_id: project_id.clone(),
            session_name: project.main_session.clone(),
            reason: FailureReason::ProvisioningFailed,
            detail,
            failed_components,
            occurred_at: now,
            duration_hours,
            spec_path: project.spec_path.clone(),
            agent_count,
            report_path: None,
        })?;

        if project.attempts + 1 <= 3 {
            store.state.transition_project(project_id, ProjectStatus::Queued)?;
            store.append(Event::ProjectStatusChanged {
                project_id: project_id.clone(),
                from: ProjectStatus::Failed,
                to: ProjectStatus::Queued,
                at: now,
                error_message: None,
                failed_components: Vec::new(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
