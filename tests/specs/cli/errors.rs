use crate::prelude::*;

#[test]
fn unknown_subcommand_is_a_usage_error() {
    cli().args(&["frobnicate"]).fails().code_eq(2).stderr_has("unrecognized subcommand");
}

#[test]
fn run_without_spec_flag_is_a_usage_error() {
    cli().args(&["run"]).fails().code_eq(2);
}

#[test]
fn queue_without_any_operation_is_a_usage_error() {
    cli().args(&["queue"]).fails().code_eq(2);
}

#[test]
fn queue_with_two_operations_is_a_usage_error() {
    cli().args(&["queue", "--list", "--status", "abc"]).fails().code_eq(2);
}

#[test]
fn scheduler_add_with_wrong_arity_is_a_usage_error() {
    cli().args(&["scheduler", "--add", "session", "role", "1", "5"]).fails().code_eq(2);
}

#[test]
fn run_with_missing_spec_file_is_a_precondition_failure() {
    let project = Project::empty();
    project
        .orc()
        .args(&["run", "--spec", "/does/not/exist/spec.md"])
        .fails()
        .code_eq(3)
        .stderr_has("specification not found");
}
