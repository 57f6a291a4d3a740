// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Scheduler Core (spec.md §4.7, component C7): the only place a
//! time-delayed tmux message gets queued and later dispatched. Everything
//! else — the orchestrator's own check-in cadence, a human's `scheduler
//! --add`, the health monitor's recovery nudge — goes through `enqueue`
//! and `dispatch_due` rather than poking the task table directly.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use thiserror::Error;

use orc_adapters::{SessionAdapter, SessionTarget};
use orc_core::clock::Clock;
use orc_core::event::Event;
use orc_core::id::IdGen;
use orc_core::ids::{Role, SessionName, TaskId};
use orc_core::task::{ScheduledTask, TaskStatus};
use orc_storage::{Store, StoreError};

use crate::config::SchedulerConfig;
use crate::messenger::{MessengerError, TmuxMessenger};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("interval_minutes must be greater than zero")]
    ZeroInterval,
    #[error("task {0} not found")]
    NotFound(String),
    #[error("malformed task target '{0}', expected 'session:window'")]
    MalformedTarget(String),
}

/// A `ScheduledTask.target` only ever holds a plain `SessionName`; the
/// scheduler stashes the window alongside the session in that single
/// string field (`session:window`) rather than widening the core entity
/// for one caller's addressing scheme, and unpacks it again here.
fn encode_target(session: &str, window: u32) -> SessionName {
    SessionName::new(format!("{session}:{window}"))
}

fn decode_target(target: &SessionName) -> Result<SessionTarget, SchedulerError> {
    let raw = target.as_str();
    let (session, window) = raw.rsplit_once(':').ok_or_else(|| SchedulerError::MalformedTarget(raw.to_string()))?;
    let window: u32 = window.parse().map_err(|_| SchedulerError::MalformedTarget(raw.to_string()))?;
    Ok(SessionTarget::new(session, window))
}

/// Outcome of a single `dispatch_due` pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<TaskId>,
    pub failed: Vec<TaskId>,
    pub unreachable: Vec<TaskId>,
}

/// Rate-limits and deduplicates the ad hoc, non-ScheduledTask notices other
/// components fire through the scheduler (a health alert, a merge
/// failure) — spec.md §4.7's dispatch quarantine: at most one per event
/// kind per `event_rate_limit`, and never the same payload twice within
/// the last 100 sends.
pub struct EventThrottle {
    rate_limit: std::time::Duration,
    last_sent: HashMap<&'static str, Instant>,
    recent_hashes: VecDeque<u64>,
}

impl EventThrottle {
    pub fn new(rate_limit: std::time::Duration) -> Self {
        Self { rate_limit, last_sent: HashMap::new(), recent_hashes: VecDeque::new() }
    }

    /// Returns `true` if `kind`/`payload` should be sent now, recording it
    /// as sent as a side effect. Call only when you are actually about to
    /// send — a `false` here means "drop it, something equivalent already
    /// went out."
    pub fn allow(&mut self, kind: &'static str, payload: &str, now: Instant) -> bool {
        if let Some(last) = self.last_sent.get(kind) {
            if now.saturating_duration_since(*last) < self.rate_limit {
                return false;
            }
        }
        let hash = {
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            kind.hash(&mut hasher);
            payload.hash(&mut hasher);
            hasher.finish()
        };
        if self.recent_hashes.contains(&hash) {
            return false;
        }
        self.last_sent.insert(kind, now);
        self.recent_hashes.push_back(hash);
        if self.recent_hashes.len() > 100 {
            self.recent_hashes.pop_front();
        }
        true
    }
}

pub struct Scheduler<S: SessionAdapter, C: Clock, I: IdGen> {
    messenger: TmuxMessenger<S, C>,
    clock: C,
    id_gen: I,
    config: SchedulerConfig,
}

impl<S: SessionAdapter, C: Clock, I: IdGen> Scheduler<S, C, I> {
    pub fn new(messenger: TmuxMessenger<S, C>, clock: C, id_gen: I, config: SchedulerConfig) -> Self {
        Self { messenger, clock, id_gen, config }
    }

    /// Enqueues a recurring check-in against `session:window` for `role`,
    /// due `interval_minutes` from now. Idempotent: a pending task already
    /// registered under the same `(session, window, role)` dedup key is
    /// returned unchanged rather than duplicated (spec.md §8 S-dedup).
    pub fn enqueue(
        &self,
        store: &mut Store,
        session: &str,
        role: &Role,
        window: u32,
        interval_minutes: u32,
        note: &str,
    ) -> Result<TaskId, SchedulerError> {
        if interval_minutes == 0 {
            return Err(SchedulerError::ZeroInterval);
        }
        self.enqueue_task(store, session, role, window, interval_minutes, Some(interval_minutes), note)
    }

    /// Enqueues a single delayed delivery that is removed from the store
    /// once dispatched rather than recurring (`ScheduledTask.one_shot`,
    /// spec.md:50): `record_delivery_success` marks it `Done` on delivery
    /// and `dispatch_due` evicts it from the task table. Same dedup-key
    /// idempotency as `enqueue`.
    pub fn enqueue_one_shot(
        &self,
        store: &mut Store,
        session: &str,
        role: &Role,
        window: u32,
        delay_minutes: u32,
        note: &str,
    ) -> Result<TaskId, SchedulerError> {
        self.enqueue_task(store, session, role, window, delay_minutes, None, note)
    }

    fn enqueue_task(
        &self,
        store: &mut Store,
        session: &str,
        role: &Role,
        window: u32,
        run_in_minutes: u32,
        interval_minutes: Option<u32>,
        note: &str,
    ) -> Result<TaskId, SchedulerError> {
        let dedup_key = format!("{session}:{window}:{role}");
        if let Some(existing) = store.state.existing_task_for_dedup_key(&dedup_key) {
            return Ok(existing.id.clone());
        }

        let now = self.clock.epoch_secs();
        let task_id = TaskId::new(self.id_gen.next());
        let next_run = now + i64::from(run_in_minutes) * 60;
        store.append(Event::TaskUpserted {
            task_id: task_id.clone(),
            target: encode_target(session, window),
            message: note.to_string(),
            dedup_key,
            interval_minutes,
            next_run_epoch: next_run,
            created_at: now,
        })?;
        Ok(task_id)
    }

    /// `SchedulerConfig::orchestrator_check_in_interval_minutes`, the
    /// orchestrator's own recurring self-check-in cadence (C7), distinct
    /// from the generic per-role check-in cadence the Lifecycle Engine
    /// uses for every other role.
    pub fn orchestrator_check_in_minutes(&self) -> u32 {
        self.config.orchestrator_check_in_interval_minutes
    }

    /// Claims every due task, delivers each through the messenger, and
    /// records success or failure. Claimed tasks move out of `due_tasks`
    /// atomically (via `TaskClaimed`) before any delivery is attempted, so
    /// a crash mid-dispatch never double-sends a task still sitting at
    /// `Pending` (spec.md §4.7 step 3's ordering).
    pub async fn dispatch_due(&self, store: &mut Store) -> Result<DispatchReport, SchedulerError> {
        let now = self.clock.epoch_secs();
        let due_ids: Vec<TaskId> = store.state.due_tasks(now).into_iter().map(|t| t.id.clone()).collect();
        if due_ids.is_empty() {
            return Ok(DispatchReport::default());
        }

        store.append(Event::TaskClaimed { task_ids: due_ids.clone(), at: now })?;

        let mut report = DispatchReport::default();
        for id in due_ids {
            let Some(task) = store.state.tasks.get(&id).cloned() else { continue };
            let target = match decode_target(&task.target) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!(task = %id, error = %e, "dropping task with an unparseable target");
                    store.append(Event::TaskRemoved { task_id: id })?;
                    continue;
                }
            };

            match self.messenger.send(None, &target, &task.message).await {
                Ok(_) => {
                    store.append(Event::TaskDeliverySucceeded { task_id: id.clone(), at: now })?;
                    report.delivered.push(id);
                }
                Err(e) => {
                    tracing::warn!(task = %id, error = %e, "scheduled delivery failed");
                    store.append(Event::TaskDeliveryFailed { task_id: id.clone(), at: now })?;
                    report.failed.push(id.clone());
                    if matches!(store.state.tasks.get(&id).map(|t| t.status), Some(TaskStatus::AgentUnreachable)) {
                        report.unreachable.push(id);
                    }
                }
            }
        }
        Ok(report)
    }

    /// Every task for a session, newest first, for `scheduler --list`.
    pub fn list<'a>(&self, store: &'a Store, session: &str) -> Vec<&'a ScheduledTask> {
        let mut tasks: Vec<&ScheduledTask> =
            store.state.tasks.values().filter(|t| t.target.as_str().starts_with(&format!("{session}:"))).collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    pub fn remove(&self, store: &mut Store, task_id: &TaskId) -> Result<(), SchedulerError> {
        if !store.state.tasks.contains_key(task_id) {
            return Err(SchedulerError::NotFound(task_id.to_string()));
        }
        store.append(Event::TaskRemoved { task_id: task_id.clone() })?;
        Ok(())
    }

    /// Drops every task registered against `session`, e.g. when a session
    /// is torn down and its check-ins would otherwise dispatch into a
    /// dead target forever (spec.md §4.7's `reset_session` maintenance
    /// hook).
    pub fn reset_session(&self, store: &mut Store, session: &str) -> Result<usize, SchedulerError> {
        let prefix = format!("{session}:");
        let ids: Vec<TaskId> = store.state.tasks.values().filter(|t| t.target.as_str().starts_with(&prefix)).map(|t| t.id.clone()).collect();
        let count = ids.len();
        for id in ids {
            store.append(Event::TaskRemoved { task_id: id })?;
        }
        Ok(count)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
