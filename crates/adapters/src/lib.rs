// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for every external collaborator the core treats as a black box
//! (spec.md §1): the tmux binary, the git binary, the agent CLI process,
//! and the notification channel. Each is an `async_trait` with a real
//! implementation, a no-op, and (behind `test-support`) a `Fake*` in-memory
//! double that records calls for assertions.

pub mod agent_cli;
pub mod git;
pub mod notify;
pub mod session;
pub mod traced;

pub use agent_cli::{AgentCliAdapter, AgentCliConfig, AgentCliError, ConfigFileAgentCli};
pub use git::{GitAdapter, GitError, ProcessGitAdapter};
pub use notify::{LogNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError, NotifyKind, RetryingNotifyAdapter};
pub use session::{NoOpSessionAdapter, SessionAdapter, SessionError, SessionTarget, TmuxAdapter};
pub use traced::{TracedGit, TracedSession};

#[cfg(any(test, feature = "test-support"))]
pub use agent_cli::{AgentCliCall, FakeAgentCliAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use git::{FakeGitAdapter, GitCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSessionAdapter, SessionCall};
