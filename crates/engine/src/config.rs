// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Every environment variable spec.md §6 enumerates is parsed here, once,
//! into a typed `Config` the composition root builds and threads through
//! every component as an explicit constructor parameter — never read ad
//! hoc with `std::env::var` deep inside business logic (spec.md §9).

use std::path::PathBuf;
use std::time::Duration;

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    std::env::var(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// C6 Lifecycle Engine knobs.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// `MAX_AUTO_ORCHESTRATE_RUNTIME_SEC`, default 7200.
    pub max_runtime: Duration,
    /// §5's bounded readiness wait per agent, 90s.
    pub readiness_timeout: Duration,
    /// §5's per-worktree-strategy timeout, 60s.
    pub worktree_strategy_timeout: Duration,
    /// Interval between pane-content polls while waiting for a window's
    /// ready indicator (§4.6 step 6).
    pub readiness_poll_interval: Duration,
    /// Substrings in a captured pane that count as "agent CLI is ready for
    /// input" (spec.md doesn't fix these; grounded on the same loose
    /// prefix-matching approach as the `STATUS` convention in §6).
    pub ready_indicators: Vec<String>,
    /// Cadence of the initial per-role check-in scheduled at the end of
    /// `provision()` (spec.md §4.6 step 9), every role but the orchestrator,
    /// which instead runs on `SchedulerConfig::orchestrator_check_in_interval_minutes`.
    pub check_in_minutes: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_runtime: Duration::from_secs(env_u64("MAX_AUTO_ORCHESTRATE_RUNTIME_SEC", 7200)),
            readiness_timeout: Duration::from_secs(90),
            worktree_strategy_timeout: Duration::from_secs(60),
            readiness_poll_interval: Duration::from_secs(2),
            ready_indicators: vec!["$ ".to_string(), "> ".to_string(), "Human:".to_string()],
            check_in_minutes: 15,
        }
    }
}

/// C9 Health Monitor knobs.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub sweep_interval: Duration,
    /// `PHANTOM_GRACE_PERIOD_SEC`, floored at 14400 (4 hours) per spec.md §6.
    pub grace_period: Duration,
    pub stuck_idle_threshold: Duration,
    pub completion_scrollback_lines: u32,
    /// Emergency escape hatch: disables every destructive action this
    /// component takes (kills, FAILED transitions) while still logging.
    pub disable_reconciliation: bool,
    pub emergency_bypass: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        let grace_secs = env_u64("PHANTOM_GRACE_PERIOD_SEC", 14400).max(14400);
        Self {
            sweep_interval: Duration::from_secs(120),
            grace_period: Duration::from_secs(grace_secs),
            stuck_idle_threshold: Duration::from_secs(30 * 60),
            completion_scrollback_lines: 200,
            disable_reconciliation: env_bool("DISABLE_RECONCILIATION"),
            emergency_bypass: env_bool("EMERGENCY_BYPASS"),
        }
    }
}

/// C11 Auto-Merge Runner knobs.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub run_interval: Duration,
    pub max_projects_per_run: usize,
    pub per_project_timeout: Duration,
    pub total_timeout: Duration,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            run_interval: Duration::from_secs(5 * 60),
            max_projects_per_run: 5,
            per_project_timeout: Duration::from_secs(300),
            total_timeout: Duration::from_secs(600),
        }
    }
}

/// C7 Scheduler Core knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub worker_pool_size: usize,
    /// `ORCHESTRATOR_CHECK_IN_INTERVAL`, default self-check cadence, minutes.
    pub orchestrator_check_in_interval_minutes: u32,
    /// `TASK_EXECUTION_TIMEOUT`, per-task dispatch cap.
    pub task_execution_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub heartbeat_staleness: Duration,
    pub event_rate_limit: Duration,
    pub status_report_window: Duration,
    pub status_report_window_limit: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            worker_pool_size: 8,
            orchestrator_check_in_interval_minutes: u32::try_from(env_u64("ORCHESTRATOR_CHECK_IN_INTERVAL", 900) / 60).unwrap_or(15).max(1),
            task_execution_timeout: Duration::from_secs(env_u64("TASK_EXECUTION_TIMEOUT", 30)),
            heartbeat_interval: Duration::from_secs(10),
            heartbeat_staleness: Duration::from_secs(60),
            event_rate_limit: Duration::from_millis(500),
            status_report_window: Duration::from_secs(5 * 60),
            status_report_window_limit: 5,
        }
    }
}

/// C2 Tmux Messenger knobs.
#[derive(Debug, Clone)]
pub struct MessengerConfig {
    /// `R=3` in spec.md §4.2 step 6.
    pub max_attempts: u32,
    /// The "small delay" §4.2 step 5 waits before capturing the pane.
    pub verify_delay: Duration,
    /// §4.2 step 6: never sent automatically unless the caller opts in.
    pub allow_ctrl_c: bool,
    /// Scrollback depth read back for verification.
    pub verify_lines: u32,
    /// Substrings whose presence in the tail of a capture counts as "a
    /// prompt glyph or equivalent" (spec.md §4.2 step 5).
    pub prompt_indicators: Vec<String>,
    /// Append-only JSONL delivery journal (spec.md §4.2 step 9). `None`
    /// disables the file sink; every attempt is still traced either way.
    pub journal_path: Option<PathBuf>,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            verify_delay: Duration::from_millis(1500),
            allow_ctrl_c: false,
            verify_lines: 50,
            prompt_indicators: vec!["$ ".to_string(), "> ".to_string(), "Human:".to_string()],
            journal_path: None,
        }
    }
}

/// C4 Worktree Manager knobs.
#[derive(Debug, Clone)]
pub struct WorktreeConfig {
    /// §5's per-strategy-attempt timeout, 60s — shared with
    /// `LifecycleConfig::worktree_strategy_timeout` but kept distinct since
    /// the manager may be driven outside a full lifecycle run (e.g. a
    /// manual re-provision).
    pub strategy_timeout: Duration,
    /// Suffix appended to the sibling worktrees directory, spec.md §6:
    /// `{parent}/{project-name}-tmux-worktrees/{role}/`.
    pub worktrees_dir_suffix: &'static str,
}

impl Default for WorktreeConfig {
    fn default() -> Self {
        Self {
            strategy_timeout: Duration::from_secs(60),
            worktrees_dir_suffix: "tmux-worktrees",
        }
    }
}

/// C10 Completion & Failure Handler knobs.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// How long a completed project's session is left alive for an operator
    /// to attach before it is reaped. Zero kills immediately.
    pub operator_attach_grace: Duration,
    /// Directory failure/completion reports are written under, relative to
    /// `state_dir`.
    pub registry_dir: PathBuf,
    /// Lines of pane scrollback captured per window in a report.
    pub report_scrollback_lines: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            operator_attach_grace: Duration::from_secs(15 * 60),
            registry_dir: PathBuf::from("registry"),
            report_scrollback_lines: 100,
        }
    }
}

/// The composition root's single configuration value. Nothing downstream
/// reaches back into the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub lifecycle: LifecycleConfig,
    pub health: HealthConfig,
    pub merge: MergeConfig,
    pub scheduler: SchedulerConfig,
    pub messenger: MessengerConfig,
    pub worktree: WorktreeConfig,
    pub completion: CompletionConfig,
    /// Sessions an automated kill path must never touch: the operator's own
    /// shell session, the orchestrator's own session name, and any
    /// operator-pattern names — spec.md §4.3's protected-sessions allow-list,
    /// carried here rather than hardcoded.
    pub protected_sessions: Vec<String>,
}

impl Config {
    pub fn from_env(state_dir: PathBuf) -> Self {
        let journal_path = Some(state_dir.join("logs").join("messenger.jsonl"));
        Self {
            lifecycle: LifecycleConfig::default(),
            health: HealthConfig::default(),
            merge: MergeConfig::default(),
            scheduler: SchedulerConfig::default(),
            messenger: MessengerConfig { journal_path, ..MessengerConfig::default() },
            worktree: WorktreeConfig::default(),
            completion: CompletionConfig::default(),
            protected_sessions: Vec::new(),
            state_dir,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
