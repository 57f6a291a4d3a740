use crate::prelude::*;

#[test]
fn merge_dry_run_reports_without_mutating_anything() {
    let project = Project::empty();
    project.git_init();
    project.stub_agent_cli();

    project
        .orc()
        .args(&["merge", "--project", project.path().to_str().unwrap(), "--branch", "main", "--dry-run"])
        .passes()
        .stdout_has("dry run")
        .stdout_has("main");
}
