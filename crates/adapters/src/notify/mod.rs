// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier adapters (spec.md §4.12): interface only. `notify(kind, subject,
//! body, attachments)` is pluggable — a log-only implementation is always
//! available, and the interface is explicitly allowed to swallow transient
//! errors behind a bounded retry rather than surface them to the caller.

mod log;
mod noop;
mod retry;

pub use log::LogNotifyAdapter;
pub use noop::NoOpNotifyAdapter;
pub use retry::RetryingNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

/// What kind of event is being reported, orthogonal to the channel used to
/// deliver it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    ProjectCompleted,
    ProjectFailed,
    AuthorizationTimedOut,
    HealthEscalation,
    MergeFailed,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for sending notifications out of the orchestrator. Implementations
/// may swallow transient delivery errors internally (spec.md §4.12) —
/// `notify` returning `Err` means delivery was abandoned after retrying, not
/// that the caller should retry again itself.
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, kind: NotifyKind, subject: &str, body: &str, attachments: &[String]) -> Result<(), NotifyError>;
}
