// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::*;

#[tokio::test]
async fn create_branch_twice_errors_like_the_real_adapter() {
    let adapter = FakeGitAdapter::new();
    adapter.create_branch(Path::new("/repo"), "developer", None).await.unwrap();
    let err = adapter.create_branch(Path::new("/repo"), "developer", None).await.unwrap_err();
    assert!(matches!(err, GitError::BranchExists(_)));
}

#[tokio::test]
async fn merge_ff_only_honors_fail_merge() {
    let adapter = FakeGitAdapter::new();
    adapter.fail_merge("developer");
    let err = adapter.merge_ff_only(Path::new("/repo"), "developer").await.unwrap_err();
    assert!(matches!(err, GitError::MergeConflict(_)));
}

#[tokio::test]
async fn is_clean_honors_mark_dirty() {
    let adapter = FakeGitAdapter::new();
    let wt = Path::new("/repo-wt");
    assert!(adapter.is_clean(wt).await.unwrap());
    adapter.mark_dirty(wt);
    assert!(!adapter.is_clean(wt).await.unwrap());
}

#[tokio::test]
async fn add_worktree_records_the_call_and_remove_clears_it() {
    let adapter = FakeGitAdapter::new();
    let wt = Path::new("/repo-wt");
    adapter.add_worktree(Path::new("/repo"), wt, "developer").await.unwrap();
    assert_eq!(adapter.list_worktrees(Path::new("/repo")).await.unwrap(), vec![wt.to_path_buf()]);
    adapter.remove_worktree(Path::new("/repo"), wt, true).await.unwrap();
    assert!(adapter.list_worktrees(Path::new("/repo")).await.unwrap().is_empty());
    assert_eq!(adapter.calls().len(), 2);
}
