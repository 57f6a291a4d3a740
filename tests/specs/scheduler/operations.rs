use crate::prelude::*;

#[test]
fn scheduler_daemon_starts_orcd_and_is_idempotent() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project.orc().args(&["scheduler", "--daemon"]).passes().stdout_has("orcd started");
    project.orc().args(&["scheduler", "--daemon"]).passes().stdout_has("already running");
}

#[test]
fn scheduler_add_then_list_round_trips() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project
        .orc()
        .args(&["scheduler", "--add", "main", "implementer", "0", "30", "check in"])
        .passes()
        .stdout_has("added task");

    project.orc().args(&["scheduler", "--list", "main"]).passes().stdout_has("every=30m").stdout_has("check in");
}

#[test]
fn scheduler_add_with_zero_interval_is_rejected() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project.orc().args(&["scheduler", "--add", "main", "implementer", "0", "0", "note"]).fails().code_eq(3);
}

#[test]
fn scheduler_remove_drops_a_task() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    let added = project.orc().args(&["scheduler", "--add", "main", "implementer", "0", "15", "note"]).passes();
    let stdout = added.stdout();
    let task_id = stdout.trim().strip_prefix("added task ").expect("output should name the task id").to_string();

    project.orc().args(&["scheduler", "--remove", &task_id]).passes().stdout_has("removed");
    project.orc().args(&["scheduler", "--list", "main"]).passes().stdout_has("no recurring tasks");
}

#[test]
fn scheduler_list_on_an_empty_session_reports_no_tasks() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    project.orc().args(&["scheduler", "--list", "nonexistent"]).passes().stdout_has("no recurring tasks");
}
