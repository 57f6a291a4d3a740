// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ScheduledTask entity driving the Scheduler Core (spec §4.7).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{SessionName, TaskId};

/// Lifecycle status of a ScheduledTask row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Dispatching,
    Done,
    /// Delivery has failed enough times that the target is presumed dead.
    AgentUnreachable,
}

/// Maximum times a task may be dispatched before it is marked unreachable.
pub const MAX_DISPATCH_ATTEMPTS: u32 = 6;

/// A recurring or one-shot message delivery scheduled against a tmux target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub target: SessionName,
    pub message: String,
    /// Deduplication key; a second `enqueue` with the same key and a
    /// pending task returns the existing id unchanged.
    pub dedup_key: String,
    /// `None` for one-shot tasks.
    pub interval_minutes: Option<u32>,
    pub next_run_epoch: i64,
    pub status: TaskStatus,
    pub dispatch_count: u32,
    pub created_at: i64,
}

impl ScheduledTask {
    pub fn new_recurring(
        id: TaskId,
        target: SessionName,
        message: String,
        dedup_key: String,
        interval_minutes: u32,
        first_run_epoch: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            target,
            message,
            dedup_key,
            interval_minutes: Some(interval_minutes),
            next_run_epoch: first_run_epoch,
            status: TaskStatus::Pending,
            dispatch_count: 0,
            created_at,
        }
    }

    /// Validating constructor rejecting the zero-interval and empty-key
    /// footguns before a task ever reaches the store.
    pub fn try_new_recurring(
        id: TaskId,
        target: SessionName,
        message: String,
        dedup_key: String,
        interval_minutes: u32,
        first_run_epoch: i64,
        created_at: i64,
    ) -> Result<Self, CoreError> {
        if interval_minutes == 0 {
            return Err(CoreError::ZeroInterval);
        }
        if dedup_key.is_empty() {
            return Err(CoreError::EmptyDedupKey);
        }
        Ok(Self::new_recurring(
            id,
            target,
            message,
            dedup_key,
            interval_minutes,
            first_run_epoch,
            created_at,
        ))
    }

    pub fn new_one_shot(
        id: TaskId,
        target: SessionName,
        message: String,
        dedup_key: String,
        run_at_epoch: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            target,
            message,
            dedup_key,
            interval_minutes: None,
            next_run_epoch: run_at_epoch,
            status: TaskStatus::Pending,
            dispatch_count: 0,
            created_at,
        }
    }

    pub fn is_due(&self, now_epoch: i64) -> bool {
        self.status == TaskStatus::Pending && self.next_run_epoch <= now_epoch
    }

    /// Backoff schedule on delivery failure: 1/2/4/8 minutes, capped at 8.
    pub fn backoff_minutes(attempt: u32) -> i64 {
        let capped = attempt.min(3);
        1i64 << capped
    }

    /// Applies a failed-delivery outcome: bump the dispatch count, reschedule
    /// with backoff, and flip to `AgentUnreachable` past the retry ceiling.
    pub fn record_delivery_failure(&mut self, now_epoch: i64) {
        self.dispatch_count += 1;
        if self.dispatch_count > MAX_DISPATCH_ATTEMPTS {
            self.status = TaskStatus::AgentUnreachable;
            return;
        }
        self.status = TaskStatus::Pending;
        self.next_run_epoch = now_epoch + Self::backoff_minutes(self.dispatch_count) * 60;
    }

    /// Applies a successful delivery: either reschedules the next recurrence
    /// or marks the one-shot task done.
    pub fn record_delivery_success(&mut self, now_epoch: i64) {
        self.dispatch_count = 0;
        match self.interval_minutes {
            Some(minutes) => {
                self.status = TaskStatus::Pending;
                self.next_run_epoch = now_epoch + i64::from(minutes) * 60;
            }
            None => self.status = TaskStatus::Done,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
