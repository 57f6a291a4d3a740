// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log-only notifier: the always-available fallback channel, in effect the
//! only channel this crate ships a fully wired implementation for (spec.md
//! §1 scopes the real email/webhook notifier out to interface level).

use async_trait::async_trait;

use super::{NotifyAdapter, NotifyError, NotifyKind};

#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifyAdapter;

impl LogNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for LogNotifyAdapter {
    async fn notify(&self, kind: NotifyKind, subject: &str, body: &str, attachments: &[String]) -> Result<(), NotifyError> {
        tracing::info!(?kind, %subject, %body, attachment_count = attachments.len(), "notification");
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
