use std::process::Command;

use crate::prelude::*;

#[test]
fn second_daemon_refuses_to_start_while_one_is_running() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project.orc().args(&["scheduler", "--daemon"]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || project.daemon_is_up()));

    let mut direct = Command::new(orcd_binary());
    direct.env("ORC_STATE_DIR", project.state_path());
    let output = direct.output().expect("orcd should run");
    assert!(!output.status.success(), "a second orcd should refuse to start");
    assert!(String::from_utf8_lossy(&output.stderr).contains("already running"));
}

#[test]
fn daemon_survives_a_crash_and_restarts_cleanly() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project.orc().args(&["scheduler", "--daemon"]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || project.daemon_is_up()));
    assert!(project.daemon_kill());
    assert!(wait_for(SPEC_WAIT_MAX_MS, || !project.daemon_is_up()));

    // `orcd`'s own startup unlinks a stale socket before binding, and the
    // advisory lock dies with the killed process, so a fresh daemon can
    // take over the same state dir without any CLI-side cleanup.
    project.orc().args(&["scheduler", "--daemon"]).passes().stdout_has("orcd started");
    project.orc().args(&["queue", "--list"]).passes().stdout_has("queue is empty");
}

#[test]
fn daemon_binary_prints_its_version() {
    let mut direct = Command::new(orcd_binary());
    direct.arg("--version");
    let output = direct.output().expect("orcd should run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("orcd"));
}
