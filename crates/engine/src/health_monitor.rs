// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Health Monitor (spec.md §4.9, component C9): a periodic sweep over
//! every PROCESSING project that (1) protects a 4-hour grace window, (2)
//! confirms session liveness with a pattern-match rediscovery fallback for
//! phantom sessions, (3) watches each agent's pane for a stuck foreground
//! process, (4) attempts in-window recovery, (5) looks for completion
//! signals, (6) raises a conditional timeout only when another project is
//! waiting for the single-concurrency slot this one holds, and (7) owns
//! the `Authorization` table (spec.md §3's ownership line): it opens a
//! request when an agent's pane asks a peer role for approval, and
//! escalates one that has sat unanswered past 80% of its timeout.
//!
//! The sweep never closes a project itself — it reports what it found, and
//! the daemon's event loop decides whether to call into
//! [`crate::completion::close_project`] (spec.md §4.9's "do not close the
//! project silently").

use std::collections::HashSet;

use thiserror::Error;

use orc_adapters::{AgentCliAdapter, AgentCliError, NotifyAdapter, NotifyKind, SessionAdapter, SessionError, SessionTarget};
use orc_core::authorization::{Authorization, AuthorizationOutcome, Priority};
use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::health::HealthStatus;
use orc_core::id::IdGen;
use orc_core::ids::{AuthorizationId, ProjectId, Role, SessionName};
use orc_core::project::{Project, ProjectStatus};
use orc_core::session::WaitingFor;
use orc_storage::{Store, StoreError};

use crate::config::HealthConfig;
use crate::messenger::{MessengerError, TmuxMessenger};

/// Substrings that, found in an agent's recent scrollback, count as a
/// self-reported completion signal (spec.md §4.9 step 5). Loose
/// prefix/substring matching, matching the `STATUS <role>` convention
/// spec.md §6 already uses for status reports.
const COMPLETION_PHRASES: &[&str] = &["PROJECT COMPLETE", "ALL TASKS COMPLETE", "TASK COMPLETE: project"];

/// Filename the orchestrator's worktree carries on completion (spec.md §6).
const COMPLETED_MARKER: &str = "COMPLETED";

/// tmux session names this system provisions end in this suffix (spec.md
/// §4.6 step 3); a rediscovery candidate matching it needs no further
/// keyword corroboration.
const SESSION_NAME_SUFFIX_PATTERN: &str = "-impl-";

/// Line prefix an agent prints to ask a peer role for a cross-role
/// approval, recognized the same way the `STATUS <role>` convention is
/// (spec.md §6, loose prefix matching): `AUTH REQUEST <to_role> <1|2|3>
/// <action...>`.
const AUTH_REQUEST_PREFIX: &str = "AUTH REQUEST";

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("agent cli error: {0}")]
    AgentCli(#[from] AgentCliError),
    #[error("messenger error: {0}")]
    Messenger(#[from] MessengerError),
    #[error("authorization {0} not found")]
    AuthorizationNotFound(String),
    #[error("authorization {0} is already resolved")]
    AuthorizationAlreadyResolved(String),
}

/// What the sweep found for a single project, for the caller to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// Still within the 4-hour protective window; nothing was acted on.
    GracePeriod,
    /// Session alive, no agent stuck, no completion signal.
    Healthy,
    /// `main_session` was missing but a unique live candidate was found and
    /// adopted.
    PhantomRediscovered { session_name: SessionName },
    /// `main_session` missing/dead and no confident candidate found twice
    /// in a row — an operator should look.
    PhantomConfirmed,
    /// Session missing but the suspicion hasn't repeated yet; no action.
    PhantomSuspectedOnce,
    /// A stuck agent was found and successfully relaunched.
    StuckAgentRecovered { role: Role },
    /// A stuck agent's CLI is not authenticated; recovery was not
    /// attempted (spec.md §4.9 step 4a).
    StuckAgentUnrecoverable { role: Role },
    /// Every signal agrees the project is done.
    CompletionDetected,
    /// A completion signal fired but peers disagree — needs operator review.
    CompletionMismatch,
    /// Age exceeds the grace period and at least one project is queued.
    ConditionalTimeout,
    /// An agent's pane asked a peer role for approval; a new `Authorization`
    /// was opened.
    AuthorizationRequested { role: Role },
    /// A pending `Authorization` sat unanswered past 80% of its timeout and
    /// was escalated.
    AuthorizationEscalated { role: Role },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub outcomes: Vec<(ProjectId, ProjectOutcome)>,
}

pub struct HealthMonitor<S: SessionAdapter, A: AgentCliAdapter, N: NotifyAdapter, C: Clock, I: IdGen> {
    session: S,
    agent_cli: A,
    messenger: TmuxMessenger<S, C>,
    notify: N,
    clock: C,
    id_gen: I,
    config: HealthConfig,
}

impl<S: SessionAdapter, A: AgentCliAdapter, N: NotifyAdapter, C: Clock, I: IdGen> HealthMonitor<S, A, N, C, I> {
    pub fn new(session: S, agent_cli: A, messenger: TmuxMessenger<S, C>, notify: N, clock: C, id_gen: I, config: HealthConfig) -> Self {
        Self { session, agent_cli, messenger, notify, clock, id_gen, config }
    }

    /// Every `Authorization` open against `session`, most recent first —
    /// backs `orc authorize --list`.
    pub fn authorizations_for(&self, store: &Store, session_name: &SessionName) -> Vec<Authorization> {
        let mut out: Vec<Authorization> = store.state.authorizations.values().filter(|a| a.session_name == *session_name).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// The operator (or a delegated policy) resolving a pending
    /// `Authorization`: appends `AuthorizationResolved`, clears the
    /// blocked agent's `waiting_for`, and delivers the decision into its
    /// pane. This is the one place outside a sweep that mutates the
    /// Authorization table, matching spec.md §3's "append/update by the
    /// Health Monitor" ownership line.
    pub async fn resolve_authorization(
        &self,
        store: &mut Store,
        authorization_id: &AuthorizationId,
        outcome: AuthorizationOutcome,
        resolution: Option<String>,
    ) -> Result<(), HealthError> {
        let authorization =
            store.state.authorizations.get(authorization_id).cloned().ok_or_else(|| HealthError::AuthorizationNotFound(authorization_id.to_string()))?;
        if authorization.status != AuthorizationOutcome::Pending {
            return Err(HealthError::AuthorizationAlreadyResolved(authorization_id.to_string()));
        }

        let now = self.clock.epoch_secs();
        store.append(Event::AuthorizationResolved { authorization_id: authorization_id.clone(), outcome, resolution: resolution.clone(), at: now })?;

        let Some(session_state) = store.state.sessions.get(&authorization.session_name).cloned() else { return Ok(()) };
        let Some(agent) = session_state.agents.get(&authorization.from_role) else { return Ok(()) };
        let blocked_on_this = matches!(&agent.waiting_for, WaitingFor::Authorization { request_id, .. } if *request_id == authorization.request_id);
        if !blocked_on_this {
            return Ok(());
        }

        store.append(Event::SessionAgentActivity {
            session_name: authorization.session_name.clone(),
            role: authorization.from_role.clone(),
            at: now,
            waiting_for: WaitingFor::Nothing,
        })?;

        let target = SessionTarget::new(authorization.session_name.as_str(), agent.window_index);
        let verdict = match outcome {
            AuthorizationOutcome::Approved => "APPROVED",
            AuthorizationOutcome::Denied => "DENIED",
            AuthorizationOutcome::Escalated | AuthorizationOutcome::Pending => "RESOLVED",
        };
        let mut brief = format!("AUTH {verdict}: {}", authorization.action);
        if let Some(note) = &resolution {
            brief.push_str(&format!(" ({note})"));
        }
        self.messenger.send(None, &target, &brief).await?;
        Ok(())
    }

    /// Runs one sweep over every PROCESSING project. `queue_pressure` is
    /// `true` iff at least one other project is QUEUED — the Health
    /// Monitor has no dependency on `ProjectQueue` itself (spec.md §9's
    /// explicit-dependency-injection guidance), so the caller supplies it.
    pub async fn sweep(&self, store: &mut Store, queue_pressure: bool) -> Result<SweepReport, HealthError> {
        if self.config.disable_reconciliation {
            tracing::warn!("DISABLE_RECONCILIATION is set; sweep will observe only");
        }

        let processing: Vec<Project> =
            store.state.projects.values().filter(|p| p.status == ProjectStatus::Processing).cloned().collect();

        let mut report = SweepReport::default();
        for project in processing {
            let outcome = self.sweep_one(store, &project, queue_pressure).await?;
            report.outcomes.push((project.id.clone(), outcome));
        }
        Ok(report)
    }

    async fn sweep_one(&self, store: &mut Store, project: &Project, queue_pressure: bool) -> Result<ProjectOutcome, HealthError> {
        let now = self.clock.epoch_secs();
        let grace_secs = self.config.grace_period.as_secs() as i64;

        let Some(started_at) = project.started_at else {
            return Ok(ProjectOutcome::GracePeriod);
        };
        if now - started_at <= grace_secs {
            return Ok(ProjectOutcome::GracePeriod);
        }

        let Some(main_session) = &project.main_session else {
            // spec.md §8 testable property #2: should not happen past the
            // grace window. Nothing actionable without a session name.
            tracing::error!(project = %project.id, "PROCESSING project missing main_session past the provisioning grace window");
            return Ok(ProjectOutcome::GracePeriod);
        };

        let alive = self.session.session_exists(main_session.as_str()).await?;
        let session_name = if alive {
            if let Some(session_state) = store.state.sessions.get(main_session).cloned() {
                if session_state.phantom_sweep_count > 0 {
                    store.append(Event::SessionPhantomCleared { session_name: main_session.clone() })?;
                }
            }
            main_session.clone()
        } else {
            match self.rediscover(store, project, main_session).await? {
                Some(outcome) => return Ok(outcome),
                None => return Ok(ProjectOutcome::PhantomConfirmed),
            }
        };

        if self.config.disable_reconciliation {
            return Ok(ProjectOutcome::Healthy);
        }

        let agent_outcome = self.sweep_agents(store, project, &session_name, now).await?;
        if let Some(outcome) = agent_outcome {
            return Ok(outcome);
        }

        if let Some(outcome) = self.check_completion(store, &session_name).await? {
            return Ok(outcome);
        }

        if now - started_at > grace_secs && queue_pressure {
            return Ok(ProjectOutcome::ConditionalTimeout);
        }

        Ok(ProjectOutcome::Healthy)
    }

    /// Pattern-match fallback for a missing session (spec.md §4.9 step 2):
    /// a live session is a candidate if created within the last 8 hours
    /// and either matches the `-impl-` suffix convention or shares at
    /// least two keywords with the project's spec stem.
    async fn rediscover(&self, store: &mut Store, project: &Project, missing: &SessionName) -> Result<Option<ProjectOutcome>, HealthError> {
        const CANDIDATE_AGE_SECS: i64 = 8 * 3600;
        let now = self.clock.epoch_secs();
        let keywords = spec_keywords(project);

        let mut candidates = Vec::new();
        for name in self.session.list_sessions().await? {
            let Some(created_at) = self.session.session_created_at(&name).await? else { continue };
            if now - created_at > CANDIDATE_AGE_SECS {
                continue;
            }
            let matches_suffix = name.contains(SESSION_NAME_SUFFIX_PATTERN);
            let keyword_hits = keywords.iter().filter(|k| name.contains(k.as_str())).count();
            if matches_suffix || keyword_hits >= 2 {
                candidates.push(name);
            }
        }

        if candidates.len() == 1 {
            let rediscovered = SessionName::new(candidates.remove(0));
            tracing::info!(project = %project.id, old = %missing, new = %rediscovered, "rediscovered phantom session");
            store.append(Event::ProjectSessionAttached { project_id: project.id.clone(), session_name: rediscovered.clone(), at: now })?;
            if let Some(session_state) = store.state.sessions.get(missing).cloned() {
                store.append(Event::SessionCreated {
                    project_id: project.id.clone(),
                    session_name: rediscovered.clone(),
                    starting_branch: session_state.starting_branch,
                    created_at: session_state.created_at,
                })?;
            }
            return Ok(Some(ProjectOutcome::PhantomRediscovered { session_name: rediscovered }));
        }

        let confirmed = if self.config.disable_reconciliation {
            false
        } else if let Some(session_state) = store.state.sessions.get(missing) {
            let would_confirm = session_state.phantom_sweep_count + 1 >= 2;
            store.append(Event::SessionPhantomSuspected { session_name: missing.clone() })?;
            would_confirm
        } else {
            false
        };

        Ok(if confirmed { None } else { Some(ProjectOutcome::PhantomSuspectedOnce) })
    }

    /// Per-agent stuck detection and recovery (spec.md §4.9 steps 3-4).
    async fn sweep_agents(
        &self,
        store: &mut Store,
        project: &Project,
        session_name: &SessionName,
        now: i64,
    ) -> Result<Option<ProjectOutcome>, HealthError> {
        let Some(session_state) = store.state.sessions.get(session_name).cloned() else { return Ok(None) };
        let idle_threshold = self.config.stuck_idle_threshold.as_secs() as i64;

        for (role, agent) in &session_state.agents {
            let target = SessionTarget::new(session_name.as_str(), agent.window_index);

            if let WaitingFor::Authorization { request_id, .. } = &agent.waiting_for {
                if let Some(outcome) =
                    self.escalate_if_overdue(store, project, session_name, role, request_id, now).await?
                {
                    return Ok(Some(outcome));
                }
            }

            let foreground = self.session.foreground_command(&target).await?;
            let expected_binary = self.agent_cli.launch_command(role).ok().and_then(|cmd| cmd.split_whitespace().next().map(str::to_string));
            let cli_present = match (&foreground, &expected_binary) {
                (Some(fg), Some(expected)) => fg.contains(expected.as_str()),
                (Some(_), None) => true,
                (None, _) => false,
            };
            let stuck = !cli_present && agent.is_idle_for(now, idle_threshold);

            let status = if stuck { HealthStatus::Stuck } else { HealthStatus::Healthy };
            store.append(Event::HealthSwept {
                project_id: project.id.clone(),
                role: role.clone(),
                status,
                foreground_command: foreground.clone(),
                at: now,
            })?;

            if stuck && !self.config.disable_reconciliation {
                if self.agent_cli.check_precondition().await.is_err() {
                    return Ok(Some(ProjectOutcome::StuckAgentUnrecoverable { role: role.clone() }));
                }

                let command = self.agent_cli.launch_command(role)?;
                self.session.send_literal(&target, &command).await?;
                self.session.send_enter(&target).await?;

                let recovery_brief = format!(
                    "Recovery: your session appears to have dropped to a shell. You were on branch '{}' in {}. Resume from your last checkpoint and report STATUS when ready.",
                    agent.branch,
                    agent.worktree.display()
                );
                self.messenger.send(None, &target, &recovery_brief).await?;

                store.append(Event::HealthRecoveryAttempted { project_id: project.id.clone(), role: role.clone(), at: now })?;
                return Ok(Some(ProjectOutcome::StuckAgentRecovered { role: role.clone() }));
            }

            if matches!(agent.waiting_for, WaitingFor::Nothing) && !self.config.disable_reconciliation {
                if let Some(outcome) = self.open_authorization_if_requested(store, project, session_name, role, agent, now).await? {
                    return Ok(Some(outcome));
                }
            }
        }

        Ok(None)
    }

    /// Scans an agent's pane for the `AUTH REQUEST` convention (spec.md §3,
    /// §6) and opens a new `Authorization` the first time it appears.
    async fn open_authorization_if_requested(
        &self,
        store: &mut Store,
        project: &Project,
        session_name: &SessionName,
        from_role: &Role,
        agent: &orc_core::session::AgentState,
        now: i64,
    ) -> Result<Option<ProjectOutcome>, HealthError> {
        let target = SessionTarget::new(session_name.as_str(), agent.window_index);
        let pane = self.session.capture_pane(&target, self.config.completion_scrollback_lines).await?;
        let Some((to_role, priority, action)) = parse_auth_request(&pane) else { return Ok(None) };

        let request_id = self.id_gen.next();
        let authorization_id = AuthorizationId::new(request_id.clone());
        store.append(Event::AuthorizationRequested {
            authorization_id,
            session_name: session_name.clone(),
            request_id: request_id.clone(),
            project_id: project.id.clone(),
            from_role: from_role.clone(),
            to_role: to_role.clone(),
            priority,
            action: action.clone(),
            requested_at: now,
        })?;
        store.append(Event::SessionAgentActivity {
            session_name: session_name.clone(),
            role: from_role.clone(),
            at: now,
            waiting_for: WaitingFor::Authorization { request_id, to_role: to_role.clone(), since: now, timeout_minutes: priority.timeout_minutes() },
        })?;

        tracing::info!(project = %project.id, role = %from_role, to_role = %to_role, action = %action, "authorization request opened");
        Ok(Some(ProjectOutcome::AuthorizationRequested { role: from_role.clone() }))
    }

    /// Escalates a pending `Authorization` once it has sat unanswered past
    /// spec.md:63's 80%-elapsed trigger, notifying the operator and letting
    /// the blocked role know not to expect a timely answer.
    async fn escalate_if_overdue(
        &self,
        store: &mut Store,
        project: &Project,
        session_name: &SessionName,
        from_role: &Role,
        request_id: &str,
        now: i64,
    ) -> Result<Option<ProjectOutcome>, HealthError> {
        let Some(authorization) = find_authorization(store, request_id) else { return Ok(None) };
        if !authorization.is_overdue(now) {
            return Ok(None);
        }

        let authorization_id = authorization.id.clone();
        let to_role = authorization.to_role.clone();
        let action = authorization.action.clone();
        store.append(Event::AuthorizationResolved {
            authorization_id,
            outcome: AuthorizationOutcome::Escalated,
            resolution: Some(format!("no response from {to_role} within timeout; escalated")),
            at: now,
        })?;

        let subject = format!("Authorization request from {from_role} to {to_role} escalated");
        if let Err(e) = self.notify.notify(NotifyKind::AuthorizationTimedOut, &subject, &action, &[]).await {
            tracing::warn!(project = %project.id, error = %e, "authorization escalation notification failed");
        }

        if let Some(session_state) = store.state.sessions.get(session_name) {
            if let Some(target_agent) = session_state.agents.get(&to_role) {
                let target = SessionTarget::new(session_name.as_str(), target_agent.window_index);
                let brief = format!("ESCALATED: {from_role}'s authorization request has gone unanswered past its timeout: {action}");
                self.messenger.send(None, &target, &brief).await?;
            }
        }

        Ok(Some(ProjectOutcome::AuthorizationEscalated { role: from_role.clone() }))
    }

    /// Completion detection (spec.md §4.9 step 5): a `COMPLETED` marker in
    /// the primary worktree or a completion phrase in any agent's
    /// scrollback, corroborated by every other agent being either aligned
    /// or silent for at least the grace period. Anything less is reported
    /// as a mismatch rather than acted on.
    async fn check_completion(&self, store: &mut Store, session_name: &SessionName) -> Result<Option<ProjectOutcome>, HealthError> {
        let Some(session_state) = store.state.sessions.get(session_name).cloned() else { return Ok(None) };

        let marker_present = primary_worktree(&session_state).map(|p| p.join(COMPLETED_MARKER).is_file()).unwrap_or(false);

        let mut phrase_role: Option<Role> = None;
        for (role, agent) in &session_state.agents {
            let target = SessionTarget::new(session_name.as_str(), agent.window_index);
            let pane = self.session.capture_pane(&target, self.config.completion_scrollback_lines).await?;
            if COMPLETION_PHRASES.iter().any(|phrase| pane.contains(phrase)) {
                phrase_role = Some(role.clone());
                break;
            }
        }

        if !marker_present && phrase_role.is_none() {
            return Ok(None);
        }

        let now = self.clock.epoch_secs();
        let grace_secs = self.config.grace_period.as_secs() as i64;
        let all_aligned = session_state.agents.values().all(|agent| {
            matches!(agent.waiting_for, orc_core::session::WaitingFor::Nothing) || agent.is_idle_for(now, grace_secs)
        });

        if all_aligned {
            Ok(Some(ProjectOutcome::CompletionDetected))
        } else {
            Ok(Some(ProjectOutcome::CompletionMismatch))
        }
    }
}

/// Lowercase alphanumeric tokens (length >= 2) from the spec file stem,
/// used as corroborating evidence in phantom-session rediscovery.
fn spec_keywords(project: &Project) -> HashSet<String> {
    let stem = project.spec_path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.split(|c: char| !c.is_alphanumeric())
        .map(|s| s.to_lowercase())
        .filter(|s| s.len() >= 2)
        .collect()
}

fn primary_worktree(session_state: &orc_core::session::SessionState) -> Option<std::path::PathBuf> {
    session_state.agents.get(&Role::new("orchestrator")).map(|a| a.worktree.clone()).or_else(|| session_state.agents.values().next().map(|a| a.worktree.clone()))
}

/// Looks for the most recent `AUTH REQUEST <to_role> <1|2|3> <action...>`
/// line in a captured pane (spec.md §6 convention, loose prefix matching).
fn parse_auth_request(pane: &str) -> Option<(Role, Priority, String)> {
    pane.lines().rev().find_map(|line| {
        let rest = line.trim().strip_prefix(AUTH_REQUEST_PREFIX)?.trim();
        let mut parts = rest.splitn(3, char::is_whitespace);
        let to_role = parts.next()?.trim();
        let priority = match parts.next()?.trim() {
            "1" => Priority::P1,
            "2" => Priority::P2,
            "3" => Priority::P3,
            _ => return None,
        };
        let action = parts.next()?.trim();
        if to_role.is_empty() || action.is_empty() {
            return None;
        }
        Some((Role::new(to_role), priority, action.to_string()))
    })
}

fn find_authorization<'a>(store: &'a Store, request_id: &str) -> Option<&'a Authorization> {
    store.state.authorizations.values().find(|a| a.request_id == request_id)
}

#[cfg(test)]
#[path = "health_monitor_tests.rs"]
mod tests;
