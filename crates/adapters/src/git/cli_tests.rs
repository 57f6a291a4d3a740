// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::Command;

use tempfile::TempDir;

use super::*;

fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let run = |args: &[&str]| {
        Command::new("git").args(args).current_dir(dir.path()).output().unwrap()
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    run(&["add", "-A"]);
    run(&["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn create_branch_then_branch_exists_reports_true() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    adapter.create_branch(repo.path(), "developer", None).await.unwrap();
    assert!(adapter.branch_exists(repo.path(), "developer").await.unwrap());
    assert!(!adapter.branch_exists(repo.path(), "nonexistent").await.unwrap());
}

#[tokio::test]
async fn create_branch_twice_errors() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    adapter.create_branch(repo.path(), "developer", None).await.unwrap();
    let err = adapter.create_branch(repo.path(), "developer", None).await.unwrap_err();
    assert!(matches!(err, GitError::BranchExists(_)));
}

#[tokio::test]
async fn add_worktree_checks_out_the_branch() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    adapter.create_branch(repo.path(), "developer", None).await.unwrap();
    let worktree = repo.path().parent().unwrap().join("developer-wt");
    adapter.add_worktree(repo.path(), &worktree, "developer").await.unwrap();
    assert_eq!(adapter.current_branch(&worktree).await.unwrap(), "developer");
    assert!(adapter.is_clean(&worktree).await.unwrap());
    let _ = std::fs::remove_dir_all(&worktree);
}

#[tokio::test]
async fn is_clean_is_false_after_an_edit() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    std::fs::write(repo.path().join("README.md"), "changed\n").unwrap();
    assert!(!adapter.is_clean(repo.path()).await.unwrap());
}

#[tokio::test]
async fn merge_ff_only_brings_in_the_branch_commit() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    adapter.create_branch(repo.path(), "feature", None).await.unwrap();
    let worktree = repo.path().parent().unwrap().join("feature-wt");
    adapter.add_worktree(repo.path(), &worktree, "feature").await.unwrap();
    std::fs::write(worktree.join("new.txt"), "content\n").unwrap();
    Command::new("git").args(["add", "-A"]).current_dir(&worktree).output().unwrap();
    Command::new("git").args(["commit", "-q", "-m", "feature work"]).current_dir(&worktree).output().unwrap();
    adapter.merge_ff_only(repo.path(), "feature").await.unwrap();
    assert!(repo.path().join("new.txt").exists());
    let _ = std::fs::remove_dir_all(&worktree);
}

#[tokio::test]
async fn reset_hard_discards_the_merge() {
    let repo = init_repo();
    let adapter = ProcessGitAdapter::new();
    let before = Command::new("git").args(["rev-parse", "HEAD"]).current_dir(repo.path()).output().unwrap();
    let before_sha = String::from_utf8_lossy(&before.stdout).trim().to_string();
    std::fs::write(repo.path().join("scratch.txt"), "x\n").unwrap();
    Command::new("git").args(["add", "-A"]).current_dir(repo.path()).output().unwrap();
    Command::new("git").args(["commit", "-q", "-m", "scratch"]).current_dir(repo.path()).output().unwrap();
    adapter.reset_hard(repo.path(), &before_sha).await.unwrap();
    assert!(!repo.path().join("scratch.txt").exists());
}
