// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's top-level error, aggregating every subsystem error so the
//! daemon's supervisory loop has one type to match on regardless of which
//! component failed.

use thiserror::Error;

use crate::automerge::MergeError;
use crate::briefer::BrieferError;
use crate::completion::CompletionError;
use crate::health_monitor::HealthError;
use crate::lifecycle::LifecycleError;
use crate::messenger::MessengerError;
use crate::queue::QueueError;
use crate::scheduler::SchedulerError;
use crate::worktree::WorktreeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Messenger(#[from] MessengerError),
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
    #[error(transparent)]
    Briefer(#[from] BrieferError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Health(#[from] HealthError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("storage error: {0}")]
    Store(#[from] orc_storage::StoreError),
}
