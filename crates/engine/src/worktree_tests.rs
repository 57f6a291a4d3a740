// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use orc_adapters::FakeGitAdapter;

use super::*;

fn config() -> WorktreeConfig {
    WorktreeConfig { strategy_timeout: Duration::from_secs(60), worktrees_dir_suffix: "tmux-worktrees" }
}

fn manager() -> (FakeGitAdapter, WorktreeManager<FakeGitAdapter>) {
    let git = FakeGitAdapter::new();
    let manager = WorktreeManager::new(git.clone(), config());
    (git, manager)
}

#[test]
fn worktrees_root_is_a_sibling_directory() {
    let (_, manager) = manager();
    let root = manager.worktrees_root(Path::new("/home/dev/widgets"));
    assert_eq!(root, Path::new("/home/dev/widgets-tmux-worktrees"));
}

#[tokio::test]
async fn rung_one_creates_a_fresh_branch_and_worktree() {
    let (git, manager) = manager();
    let ws = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap();

    assert_eq!(ws.branch, "main-dev");
    assert_eq!(ws.path, Path::new("/repo-tmux-worktrees/dev"));
    assert!(!ws.detached);
    assert!(git.calls().iter().any(|c| matches!(c, orc_adapters::GitCall::CreateBranch { branch } if branch == "main-dev")));
}

#[tokio::test]
async fn rung_two_reuses_an_already_existing_branch() {
    let (git, manager) = manager();
    git.create_branch(Path::new("/repo"), "main-dev", None).await.unwrap();

    let ws = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap();

    assert_eq!(ws.branch, "main-dev");
    assert!(!ws.detached);
}

#[tokio::test]
async fn rung_three_reuses_a_clean_existing_worktree_at_the_path() {
    let (git, manager) = manager();
    let path = manager.worktrees_root(Path::new("/repo")).join("dev");
    git.create_branch(Path::new("/repo"), "main-dev", None).await.unwrap();
    git.add_worktree(Path::new("/repo"), &path, "some-other-branch").await.unwrap();

    let ws = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap();

    assert_eq!(ws.branch, "some-other-branch");
    assert_eq!(ws.path, path);
    assert!(!ws.detached);
}

#[tokio::test]
async fn rung_three_replaces_a_dirty_worktree_only_when_forced() {
    let (git, manager) = manager();
    let path = manager.worktrees_root(Path::new("/repo")).join("dev");
    git.create_branch(Path::new("/repo"), "main-dev", None).await.unwrap();
    git.add_worktree(Path::new("/repo"), &path, "stale-branch").await.unwrap();
    git.mark_dirty(&path);

    let err = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap_err();
    assert!(matches!(err, WorktreeError::AllStrategiesFailed { .. }));

    let ws = manager.provision(Path::new("/repo"), "dev", "main", true).await.unwrap();
    assert_eq!(ws.branch, "main-dev");
    assert!(git.calls().iter().any(|c| matches!(c, orc_adapters::GitCall::RemoveWorktree { force: true, .. })));
}

#[tokio::test]
async fn exhausting_every_rung_reports_what_each_one_tried() {
    let (git, manager) = manager();
    let path = manager.worktrees_root(Path::new("/repo")).join("dev");
    git.create_branch(Path::new("/repo"), "main-dev", None).await.unwrap();
    git.add_worktree(Path::new("/repo"), &path, "stale-branch").await.unwrap();
    git.mark_dirty(&path);

    let err = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap_err();
    match err {
        WorktreeError::AllStrategiesFailed { role, detail } => {
            assert_eq!(role, "dev");
            assert!(detail.contains("rung 1"), "{detail}");
            assert!(detail.contains("rung 2"), "{detail}");
            assert!(detail.contains("rerun with --force"), "{detail}");
            assert!(detail.contains("rung 4"), "{detail}");
        }
        other => panic!("expected AllStrategiesFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn release_removes_a_clean_worktree_but_leaves_a_dirty_one() {
    let (git, manager) = manager();
    let ws = manager.provision(Path::new("/repo"), "dev", "main", false).await.unwrap();

    manager.release(Path::new("/repo"), &ws).await.unwrap();
    assert!(git.calls().iter().any(|c| matches!(c, orc_adapters::GitCall::RemoveWorktree { force: false, .. })));

    let ws2 = manager.provision(Path::new("/repo"), "other", "main", false).await.unwrap();
    git.mark_dirty(&ws2.path);
    let calls_before = git.calls().len();
    manager.release(Path::new("/repo"), &ws2).await.unwrap();
    assert_eq!(git.calls().len(), calls_before);
}

#[test]
fn starting_branch_round_trips_through_a_sentinel_file() {
    let dir = tempfile::tempdir().unwrap();
    WorktreeManager::<FakeGitAdapter>::record_starting_branch(dir.path(), "main").unwrap();
    let read = WorktreeManager::<FakeGitAdapter>::read_starting_branch(dir.path()).unwrap();
    assert_eq!(read, "main");
}
