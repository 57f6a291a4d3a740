// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const FOUR_HOURS: i64 = 4 * 3600;

#[test]
fn grace_window_blocks_action_until_elapsed() {
    let health = AgentHealth::new(ProjectId::new("proj-1"), Role::new("developer"), 0);
    assert!(!health.past_grace_window(FOUR_HOURS - 1, FOUR_HOURS));
    assert!(health.past_grace_window(FOUR_HOURS + 1, FOUR_HOURS));
}

#[test]
fn record_sweep_updates_status_and_command() {
    let mut health = AgentHealth::new(ProjectId::new("proj-1"), Role::new("developer"), 0);
    health.record_sweep(100, HealthStatus::Stuck, Some("cargo build".into()));
    assert_eq!(health.status, HealthStatus::Stuck);
    assert_eq!(health.last_foreground_command.as_deref(), Some("cargo build"));
    assert_eq!(health.last_checked_epoch, 100);
}

#[test]
fn recovery_attempt_increments_and_marks_recovering() {
    let mut health = AgentHealth::new(ProjectId::new("proj-1"), Role::new("developer"), 0);
    health.record_recovery_attempt(200);
    health.record_recovery_attempt(300);
    assert_eq!(health.recovery_attempts, 2);
    assert_eq!(health.status, HealthStatus::Recovering);
}
