use crate::prelude::*;

#[test]
fn run_new_project_creates_a_missing_project_directory() {
    let project = Project::empty();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);
    let target = project.path().join("fresh-subdir");
    assert!(!target.exists());

    project
        .orc()
        .args(&["run", "--spec", spec_path.to_str().unwrap(), "--project", target.to_str().unwrap(), "--new-project"])
        .passes();

    assert!(target.is_dir());
}

#[test]
fn run_without_new_project_against_a_missing_directory_still_enqueues() {
    // `--project` only names where the worktrees will eventually be rooted;
    // the queue accepts the path as-is and the worktree ladder is what
    // fails loudly later if the directory never shows up.
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();
    let spec_path = project.spec_file("spec.md", MINIMAL_SPEC);
    let target = project.path().join("untouched-subdir");

    project
        .orc()
        .args(&["run", "--spec", spec_path.to_str().unwrap(), "--project", target.to_str().unwrap()])
        .passes()
        .stdout_has("enqueued project");
    assert!(!target.exists());
}
