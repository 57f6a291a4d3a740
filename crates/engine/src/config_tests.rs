// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use serial_test::serial;

use super::*;

#[test]
#[serial]
fn defaults_match_spec_values_when_unset() {
    for key in [
        "MAX_AUTO_ORCHESTRATE_RUNTIME_SEC",
        "PHANTOM_GRACE_PERIOD_SEC",
        "ORCHESTRATOR_CHECK_IN_INTERVAL",
        "TASK_EXECUTION_TIMEOUT",
        "DISABLE_RECONCILIATION",
        "EMERGENCY_BYPASS",
    ] {
        std::env::remove_var(key);
    }
    let config = Config::from_env(PathBuf::from("/tmp/orc-test"));
    assert_eq!(config.lifecycle.max_runtime, Duration::from_secs(7200));
    assert_eq!(config.health.grace_period, Duration::from_secs(14400));
    assert!(!config.health.disable_reconciliation);
    assert!(!config.health.emergency_bypass);
}

#[test]
#[serial]
fn phantom_grace_period_is_floored_at_four_hours() {
    std::env::set_var("PHANTOM_GRACE_PERIOD_SEC", "60");
    let config = Config::from_env(PathBuf::from("/tmp/orc-test"));
    assert_eq!(config.health.grace_period, Duration::from_secs(14400));
    std::env::remove_var("PHANTOM_GRACE_PERIOD_SEC");
}

#[test]
#[serial]
fn disable_reconciliation_reads_the_escape_hatch() {
    std::env::set_var("DISABLE_RECONCILIATION", "1");
    let config = Config::from_env(PathBuf::from("/tmp/orc-test"));
    assert!(config.health.disable_reconciliation);
    std::env::remove_var("DISABLE_RECONCILIATION");
}
