// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps any [`NotifyAdapter`] with the bounded in-memory retry spec.md
//! §4.12 explicitly allows: 3 attempts, exponential backoff, transient
//! errors swallowed rather than surfaced once attempts are exhausted.

use std::time::Duration;

use async_trait::async_trait;
use orc_shell::RetryPolicy;

use super::{NotifyAdapter, NotifyError, NotifyKind};

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const BACKOFF_CAP: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RetryingNotifyAdapter<N> {
    inner: N,
}

impl<N> RetryingNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for RetryingNotifyAdapter<N> {
    async fn notify(&self, kind: NotifyKind, subject: &str, body: &str, attachments: &[String]) -> Result<(), NotifyError> {
        let backoffs = RetryPolicy::capped_backoff(MAX_ATTEMPTS, INITIAL_BACKOFF, BACKOFF_CAP);
        let mut last_err = NotifyError::SendFailed("no attempts made".to_string());
        for (attempt, backoff) in backoffs.iter().enumerate() {
            match self.inner.notify(kind, subject, body, attachments).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(?kind, attempt = attempt + 1, error = %e, "notify attempt failed");
                    last_err = e;
                    if attempt + 1 < MAX_ATTEMPTS as usize {
                        tokio::time::sleep(*backoff).await;
                    }
                }
            }
        }
        tracing::error!(?kind, %subject, "notification delivery abandoned after exhausting retries");
        Err(last_err)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
