// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composition root's single bundle of engine components, wired to
//! concrete adapters, and the one `tick()` that drives every periodic
//! duty spec.md assigns the daemon process: queue promotion (C8 into
//! C6), scheduled check-in dispatch (C7), the health sweep (C9), the
//! completion/failure close-out it triggers (C10), and the auto-merge
//! pass (C11).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use orc_adapters::{
    AgentCliConfig, ConfigFileAgentCli, LogNotifyAdapter, ProcessGitAdapter, RetryingNotifyAdapter, TmuxAdapter,
};
use orc_core::clock::SystemClock;
use orc_core::failure::FailureReason;
use orc_core::id::UuidIdGen;
use orc_core::ids::ProjectId;
use orc_core::project::ProjectStatus;
use orc_engine::{
    AutoMergeRunner, CloseOutcome, CompletionHandler, Config, HealthMonitor, LifecycleEngine, MergeError, ProjectQueue,
    Scheduler, TmuxMessenger, WorktreeManager,
};
use orc_storage::Store;

pub type DaemonGit = ProcessGitAdapter;
pub type DaemonSession = TmuxAdapter;
pub type DaemonAgentCli = ConfigFileAgentCli;
pub type DaemonNotify = RetryingNotifyAdapter<LogNotifyAdapter>;
pub type DaemonClock = SystemClock;
pub type DaemonIdGen = UuidIdGen;

/// One pass over every pending duty. Callers drive this on a fixed tick
/// (`SchedulerConfig::tick_interval`); nothing in here sleeps on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickReport {
    pub provisioned: Option<ProjectId>,
    pub dispatched: usize,
    pub closed: Vec<ProjectId>,
    pub reaped: Vec<ProjectId>,
    pub merge_runs: usize,
}

/// Outcome of a single `merge --project` invocation or a merge-tick pass,
/// shared by the engine loop and the `merge` CLI subcommand over IPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeReport {
    pub results: Vec<(ProjectId, String)>,
}

pub struct Supervisor {
    queue: ProjectQueue<DaemonClock, DaemonIdGen>,
    lifecycle: LifecycleEngine<DaemonGit, DaemonSession, DaemonAgentCli, DaemonClock, DaemonIdGen>,
    health: HealthMonitor<DaemonSession, DaemonAgentCli, DaemonNotify, DaemonClock, DaemonIdGen>,
    completion: CompletionHandler<DaemonSession, DaemonNotify, DaemonClock, DaemonIdGen>,
    merge: AutoMergeRunner<DaemonGit, DaemonClock>,
    scheduler: Scheduler<DaemonSession, DaemonClock, DaemonIdGen>,
    merge_tick_every: u32,
}

impl Supervisor {
    pub fn new(config: &Config, agent_cli_config: AgentCliConfig, merge_lock_path: PathBuf) -> Self {
        let git = ProcessGitAdapter::new();
        let session = TmuxAdapter::new();
        let agent_cli = ConfigFileAgentCli::new(agent_cli_config);
        let notify = RetryingNotifyAdapter::new(LogNotifyAdapter::new());
        let clock = SystemClock;
        let id_gen = UuidIdGen;

        let worktree = WorktreeManager::new(git, config.worktree.clone());
        let briefer_messenger = TmuxMessenger::new(session.clone(), clock, config.messenger.clone());
        let briefer = orc_engine::AgentBriefer::new(briefer_messenger);

        let lifecycle_scheduler_messenger = TmuxMessenger::new(session.clone(), clock, config.messenger.clone());
        let lifecycle_scheduler = Scheduler::new(lifecycle_scheduler_messenger, clock, id_gen.clone(), config.scheduler.clone());
        let lifecycle = LifecycleEngine::new(
            ProcessGitAdapter::new(),
            worktree,
            session.clone(),
            agent_cli.clone(),
            briefer,
            lifecycle_scheduler,
            clock,
            id_gen.clone(),
            config.lifecycle.clone(),
        );

        let health_messenger = TmuxMessenger::new(session.clone(), clock, config.messenger.clone());
        let health =
            HealthMonitor::new(session.clone(), agent_cli, health_messenger, notify.clone(), clock, id_gen.clone(), config.health.clone());

        let completion =
            CompletionHandler::new(session.clone(), notify, clock, id_gen.clone(), config.state_dir.clone(), config.completion.clone());

        let merge = AutoMergeRunner::new(ProcessGitAdapter::new(), clock, config.merge.clone(), merge_lock_path);

        let scheduler_messenger = TmuxMessenger::new(session, clock, config.messenger.clone());
        let scheduler = Scheduler::new(scheduler_messenger, clock, id_gen.clone(), config.scheduler.clone());

        let queue = ProjectQueue::new(clock, id_gen);

        Self { queue, lifecycle, health, completion, merge, scheduler, merge_tick_every: 300 }
    }

    pub fn queue(&self) -> &ProjectQueue<DaemonClock, DaemonIdGen> {
        &self.queue
    }

    /// `orc run`'s entry point: enqueue a single project. Thin forwarder
    /// kept on `Supervisor` rather than making callers reach into `queue()`
    /// for the one mutating call the listener needs outside of `tick`.
    pub fn submit(
        &self,
        store: &mut Store,
        spec_path: PathBuf,
        project_path: PathBuf,
        plan: orc_core::project::Plan,
    ) -> Result<ProjectId, orc_engine::QueueError> {
        self.queue.submit(store, spec_path, project_path, plan)
    }

    pub fn scheduler(&self) -> &Scheduler<DaemonSession, DaemonClock, DaemonIdGen> {
        &self.scheduler
    }

    pub fn health(&self) -> &HealthMonitor<DaemonSession, DaemonAgentCli, DaemonNotify, DaemonClock, DaemonIdGen> {
        &self.health
    }

    /// Promotes the next eligible project (if the single PROCESSING slot
    /// is free), dispatches due scheduled tasks, runs one health sweep and
    /// acts on whatever it reports, and reaps any completed project past
    /// its operator-attach grace window. The merge pass is driven
    /// separately by the caller at its own (much slower) cadence — see
    /// `tick_number % merge_tick_every`.
    pub async fn tick(&self, store: &mut Store, tick_number: u64) -> TickReport {
        let mut report = TickReport::default();

        if let Some(project) = self.queue.next_queued(store) {
            let project_id = project.id.clone();
            let spec_path = project.spec_path.clone();
            match std::fs::read_to_string(&spec_path) {
                Ok(spec_text) => {
                    if let Err(e) = self.lifecycle.provision(store, &project_id, &spec_text).await {
                        tracing::error!(project = %project_id, error = %e, "provisioning failed");
                    } else {
                        report.provisioned = Some(project_id);
                    }
                }
                Err(e) => {
                    tracing::error!(project = %project_id, spec_path = %spec_path.display(), error = %e, "could not read specification file");
                }
            }
        }

        match self.scheduler.dispatch_due(store).await {
            Ok(dispatch) => report.dispatched = dispatch.delivered.len(),
            Err(e) => tracing::warn!(error = %e, "scheduled dispatch failed"),
        }

        let queue_pressure = store.state.projects.values().any(|p| p.status == ProjectStatus::Queued);
        match self.health.sweep(store, queue_pressure).await {
            Ok(sweep) => {
                for (project_id, outcome) in sweep.outcomes {
                    if let Some(close) = self.close_outcome_for(&outcome) {
                        match self.completion.close_project(store, &project_id, close.0, close.1).await {
                            Ok(_) => report.closed.push(project_id),
                            Err(e) => tracing::error!(project = %project_id, error = %e, "failed to close project"),
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "health sweep failed"),
        }

        match self.completion.reap_expired(store).await {
            Ok(reaped) => report.reaped = reaped,
            Err(e) => tracing::warn!(error = %e, "reap of expired sessions failed"),
        }

        if tick_number % u64::from(self.merge_tick_every) == 0 {
            match self.run_merge(store).await {
                Ok(r) => report.merge_runs = r.results.len(),
                Err(MergeError::AlreadyRunning) => {}
                Err(e) => tracing::warn!(error = %e, "auto-merge pass failed"),
            }
        }

        report
    }

    pub async fn run_merge(&self, store: &mut Store) -> Result<MergeReport, MergeError> {
        let results = self.merge.run(store).await?;
        Ok(MergeReport { results: results.into_iter().map(|(id, outcome)| (id, format!("{outcome:?}"))).collect() })
    }

    fn close_outcome_for(&self, outcome: &orc_engine::health_monitor::ProjectOutcome) -> Option<(CloseOutcome, String)> {
        use orc_engine::health_monitor::ProjectOutcome::*;
        match outcome {
            CompletionDetected => Some((CloseOutcome::Completed, "completion signal detected and corroborated".to_string())),
            ConditionalTimeout => {
                Some((CloseOutcome::Failed { reason: FailureReason::HealthTimeout }, "timeout_with_pending_specs".to_string()))
            }
            PhantomConfirmed => Some((
                CloseOutcome::Failed { reason: FailureReason::StuckAgentUnrecovered },
                "session phantom: no live candidate found across two sweeps".to_string(),
            )),
            StuckAgentUnrecoverable { role } => Some((
                CloseOutcome::Failed { reason: FailureReason::StuckAgentUnrecovered },
                format!("role '{role}' is stuck and its agent CLI is not authenticated"),
            )),
            _ => None,
        }
    }
}
