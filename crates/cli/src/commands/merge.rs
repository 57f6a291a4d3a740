// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc merge` — spec.md §6/C12: runs the auto-merge pipeline against the
//! already-COMPLETED, unmerged projects the daemon is tracking.
//!
//! `--project`/`--branch` identify the work for the operator's benefit in
//! the printed report; the pass itself is bounded and global (C12 never
//! merges more than one project's worth of work per invocation, per
//! spec.md §4.12), so a single `orc merge` call may report on a different
//! project than the one named here if that one finishes first.

use anyhow::Result;
use clap::Args;

use orc_daemon::{Request, Response};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Project whose completed work should be merged.
    #[arg(long)]
    pub project: std::path::PathBuf,

    /// Branch to merge into (the project's default branch if omitted in
    /// the underlying git remote's HEAD).
    #[arg(long)]
    pub branch: String,

    /// Report what would happen without pushing or tagging anything.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle(args: MergeArgs) -> Result<()> {
    let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
    let request = Request::Merge { project_path: args.project, branch: args.branch, dry_run: args.dry_run };
    match client.send(&request).await.map_err(ExitError::from)? {
        Response::MergeResult(report) => {
            println!("{}", serde_json::to_string_pretty(&report).map_err(|e| ExitError::new(4, e.to_string()))?);
            Ok(())
        }
        Response::Error { message } => Err(ExitError::new(4, message).into()),
        _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
    }
}
