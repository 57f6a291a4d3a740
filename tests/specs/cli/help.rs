use crate::prelude::*;

#[test]
fn top_level_help_lists_every_subcommand() {
    cli().args(&["--help"]).passes().stdout_has("run").stdout_has("queue").stdout_has("scheduler").stdout_has("merge");
}

#[test]
fn version_flag_prints_a_version() {
    cli().args(&["--version"]).passes().stdout_has("orc");
}

#[test]
fn run_help_documents_its_flags() {
    cli().args(&["run", "--help"]).passes().stdout_has("--spec").stdout_has("--plan");
}

#[test]
fn queue_help_documents_its_flags() {
    cli().args(&["queue", "--help"]).passes().stdout_has("--list").stdout_has("--status");
}

#[test]
fn scheduler_help_documents_its_flags() {
    cli().args(&["scheduler", "--help"]).passes().stdout_has("--add").stdout_has("--daemon");
}

#[test]
fn merge_help_documents_its_flags() {
    cli().args(&["merge", "--help"]).passes().stdout_has("--branch").stdout_has("--dry-run");
}
