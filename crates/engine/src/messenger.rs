// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Tmux Messenger (spec.md §4.2, component C2): the only way anything
//! in this system puts text in front of an agent. Every other component —
//! the briefer, the scheduler, the health monitor's recovery path — calls
//! through here rather than touching `SessionAdapter::send_literal`
//! directly, so the retry/verification/self-send contract is enforced in
//! exactly one place.

use std::fs::OpenOptions;
use std::io::Write as _;

use orc_core::clock::Clock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use orc_adapters::{SessionAdapter, SessionError, SessionTarget};

use crate::config::MessengerConfig;

/// A known stuck-wrapper marker left behind by a hung MCP-style tool
/// bridge (spec.md §4.2 step 8); seeing this in a pane after a send means
/// the agent process is alive but its event loop is wedged.
const STUCK_MARKER_PREFIX: &str = "TMUX_MCP_";

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("self-send rejected: {0}")]
    SelfSend(String),
    #[error("target is dead: {0}")]
    DeadTarget(String),
    #[error("verification failed for {target} after {attempts} attempt(s)")]
    VerificationFailed { target: String, attempts: u32 },
    #[error("tmux error: {0}")]
    Tmux(#[from] SessionError),
}

/// What happened when [`TmuxMessenger::send`] returned `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Delivered and verified, after this many attempts (>= 1).
    Delivered { attempts: u32 },
    /// A no-op: `target` was the caller's own context (spec.md §4.2 step 1).
    SelfSend,
}

#[derive(Serialize)]
struct DeliveryRecord {
    timestamp: i64,
    sender: Option<String>,
    recipient: String,
    payload_hash: String,
    attempts: u32,
    success: bool,
}

/// Splits a payload that ends in a slash command (spec.md §4.2 step 7) so
/// the prose and the command line are sent as two transmissions and only
/// the command line's Enter commits the line tmux would otherwise see as
/// one long literal. Plain prose with no slash command is returned
/// entirely as the prose half.
fn split_slash_command(message: &str) -> (Option<String>, Option<String>) {
    if let Some(idx) = message.rfind("\n/") {
        let prose = message[..idx].trim_end();
        let slash = message[idx + 1..].trim_end().to_string();
        (if prose.is_empty() { None } else { Some(prose.to_string()) }, Some(slash))
    } else if message.trim_start().starts_with('/') {
        (None, Some(message.trim_end().to_string()))
    } else {
        (Some(message.to_string()), None)
    }
}

#[derive(Clone)]
pub struct TmuxMessenger<S: SessionAdapter, C: Clock> {
    session: S,
    clock: C,
    config: MessengerConfig,
}

impl<S: SessionAdapter, C: Clock> TmuxMessenger<S, C> {
    pub fn new(session: S, clock: C, config: MessengerConfig) -> Self {
        Self { session, clock, config }
    }

    /// Delivers `message` to `target`. `from`, when given, is the caller's
    /// own `session:window` — equal to `target`, the send is rejected as a
    /// no-op (testable property: boundary behaviors, spec.md §8).
    pub async fn send(
        &self,
        from: Option<&SessionTarget>,
        target: &SessionTarget,
        message: &str,
    ) -> Result<SendOutcome, MessengerError> {
        if from == Some(target) {
            tracing::warn!(target = %target, "refusing to send a message to our own window");
            return Ok(SendOutcome::SelfSend);
        }

        if !self.session.session_exists(&target.session).await? || !self.session.window_exists(target).await? {
            self.journal(from, target, message, 0, false);
            return Err(MessengerError::DeadTarget(target.to_string()));
        }

        let (prose, slash) = split_slash_command(message);
        let mut attempts = 0u32;
        let mut last_err: Option<MessengerError> = None;

        while attempts < self.config.max_attempts {
            attempts += 1;
            if attempts > 1 {
                self.reset_pane(target).await?;
                tokio::time::sleep(self.config.verify_delay * attempts).await;
            }

            self.deliver_once(target, prose.as_deref(), slash.as_deref()).await?;

            if self.verify(target, message).await? {
                self.journal(from, target, message, attempts, true);
                return Ok(SendOutcome::Delivered { attempts });
            }
            last_err = Some(MessengerError::VerificationFailed { target: target.to_string(), attempts });
        }

        self.journal(from, target, message, attempts, false);
        Err(last_err.unwrap_or(MessengerError::VerificationFailed { target: target.to_string(), attempts }))
    }

    /// Exits copy mode if needed, then sends the prose half (if any)
    /// followed by the slash-command half (if any), each ending in its own
    /// Enter.
    async fn deliver_once(&self, target: &SessionTarget, prose: Option<&str>, slash: Option<&str>) -> Result<(), MessengerError> {
        if self.session.is_in_copy_mode(target).await? {
            self.session.send_escape(target).await?;
        }
        if let Some(prose) = prose {
            self.session.send_literal(target, prose).await?;
            self.session.send_enter(target).await?;
        }
        if let Some(slash) = slash {
            self.session.send_literal(target, slash).await?;
            self.session.send_enter(target).await?;
        }
        Ok(())
    }

    /// Escape, to clear any partial input line, between retry attempts.
    /// Never Ctrl-C unless the caller has explicitly opted in (spec.md
    /// §4.2 step 6).
    async fn reset_pane(&self, target: &SessionTarget) -> Result<(), MessengerError> {
        self.session.send_escape(target).await?;
        Ok(())
    }

    /// Captures recent pane scrollback and checks for (a) the stuck-wrapper
    /// repair loop, then (b) the literal payload plus a prompt indicator.
    async fn verify(&self, target: &SessionTarget, payload: &str) -> Result<bool, MessengerError> {
        tokio::time::sleep(self.config.verify_delay).await;
        let mut pane = self.session.capture_pane(target, self.config.verify_lines).await?;

        if pane.contains(STUCK_MARKER_PREFIX) {
            self.session.send_enter(target).await?;
            tokio::time::sleep(self.config.verify_delay).await;
            pane = self.session.capture_pane(target, self.config.verify_lines).await?;

            if pane.contains(STUCK_MARKER_PREFIX) && self.config.allow_ctrl_c {
                self.session.send_ctrl_c(target).await?;
                self.session.send_enter(target).await?;
                tokio::time::sleep(self.config.verify_delay).await;
                pane = self.session.capture_pane(target, self.config.verify_lines).await?;
            }
        }

        let trimmed = payload.trim();
        let payload_visible = trimmed.is_empty() || trimmed.lines().all(|line| pane.contains(line.trim()));
        let prompt_visible = self.config.prompt_indicators.iter().any(|ind| pane.contains(ind.as_str()));
        Ok(payload_visible && prompt_visible)
    }

    fn journal(&self, from: Option<&SessionTarget>, target: &SessionTarget, message: &str, attempts: u32, success: bool) {
        let hash = format!("{:x}", Sha256::digest(message.as_bytes()));
        let record = DeliveryRecord {
            timestamp: self.clock.epoch_secs(),
            sender: from.map(ToString::to_string),
            recipient: target.to_string(),
            payload_hash: hash,
            attempts,
            success,
        };
        tracing::info!(recipient = %target, attempts, success, "tmux message delivery attempt");
        let Some(path) = &self.config.journal_path else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else { return };
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = writeln!(file, "{line}");
        }
    }
}

#[cfg(test)]
#[path = "messenger_tests.rs"]
mod tests;
