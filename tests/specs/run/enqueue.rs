use crate::prelude::*;

#[test]
fn run_enqueues_a_project_visible_in_the_queue() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);

    project.orc().args(&["run", "--spec", spec_path.to_str().unwrap()]).passes().stdout_has("enqueued project");

    project.orc().args(&["queue", "--list"]).passes().stdout_has(project.path().to_str().unwrap());
}

#[test]
fn run_defaults_project_path_to_the_spec_files_parent() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);

    let out = project.orc().args(&["run", "--spec", spec_path.to_str().unwrap()]).passes();
    assert!(out.stdout().contains("enqueued project"));

    let status = project.orc().args(&["queue", "--list"]).passes();
    status.stdout_has(project.path().to_str().unwrap());
}

#[test]
fn run_resume_on_an_unknown_project_is_an_operational_error() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project.orc().args(&["run", "--spec", "spec.md", "--resume"]).fails().code_eq(3);
}
