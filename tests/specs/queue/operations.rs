use crate::prelude::*;

fn enqueued_project_id(project: &Project) -> String {
    let listing = project.orc().args(&["queue", "--list"]).passes();
    let stdout = listing.stdout();
    let line = stdout.lines().next().expect("one project should be queued");
    line.split_whitespace().next().expect("line should start with a project id").to_string()
}

#[test]
fn queue_status_shows_full_detail_for_a_known_project() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);
    project.orc().args(&["run", "--spec", spec_path.to_str().unwrap()]).passes();

    let id = enqueued_project_id(&project);
    project.orc().args(&["queue", "--status", &id]).passes().stdout_has(&id).stdout_has("project_path");
}

#[test]
fn queue_status_on_unknown_id_is_an_operational_error() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    // Touch the daemon so a socket exists without enqueueing anything.
    project.orc().args(&["queue", "--list"]).passes();

    project.orc().args(&["queue", "--status", "no-such-project"]).fails().code_eq(3);
}

#[test]
fn queue_remove_drops_a_queued_project() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);
    project.orc().args(&["run", "--spec", spec_path.to_str().unwrap()]).passes();
    let id = enqueued_project_id(&project);

    project.orc().args(&["queue", "--remove", &id]).passes().stdout_has("removed");
}

#[test]
fn queue_reset_on_a_queued_project_is_rejected() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);
    project.orc().args(&["run", "--spec", spec_path.to_str().unwrap()]).passes();
    let id = enqueued_project_id(&project);

    project.orc().args(&["queue", "--reset", &id]).fails().code_eq(4);
}
