// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc run` — spec.md §6: enqueues a project for orchestration. Never
//! runs inline; the daemon's queue (C8) promotes it in FIFO order once
//! the single-concurrency slot is free.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::Args;

use orc_core::ids::ProjectId;
use orc_core::project::Plan;
use orc_daemon::{Request, Response};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

fn parse_plan(s: &str) -> Result<Plan, String> {
    Plan::from_str(s)
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the human-readable project specification.
    #[arg(long)]
    pub spec: PathBuf,

    /// Target working copy. Defaults to the spec's parent directory.
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Create `project` as a fresh git repository before enqueuing.
    #[arg(long = "new-project")]
    pub new_project: bool,

    /// Subscription plan tier, used to size the default team when the
    /// spec doesn't enumerate roles explicitly.
    #[arg(long, value_parser = parse_plan, default_value = "max5")]
    pub plan: Plan,

    /// Explicit role list, overriding the plan's default team.
    #[arg(long, value_delimiter = ',')]
    pub roles: Vec<String>,

    /// Mark this submission as part of a multi-spec batch (shares retry
    /// and surfacing semantics with any other project in the same batch).
    #[arg(long)]
    pub batch: bool,

    /// Replace an existing worktree/branch for a role rather than failing.
    #[arg(long)]
    pub force: bool,

    /// Resume a previously FAILED or still-PROCESSING project at this
    /// project path instead of enqueuing a new one.
    #[arg(long)]
    pub resume: bool,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    if !args.spec.exists() {
        return Err(ExitError::new(3, format!("specification not found: {}", args.spec.display())).into());
    }
    let project_path = args.project.clone().unwrap_or_else(|| {
        args.spec.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
    });
    if args.new_project && !project_path.exists() {
        std::fs::create_dir_all(&project_path).map_err(|e| ExitError::new(4, format!("could not create project directory: {e}")))?;
    }

    let client = DaemonClient::for_action().await.map_err(ExitError::from)?;

    if args.resume {
        let project_id = find_project_id_for_path(&client, &project_path).await?;
        match client.send(&Request::RunResume { project_id: project_id.clone() }).await.map_err(ExitError::from)? {
            Response::ProjectResumed { project_id, session_name } => {
                println!("resumed project {project_id}");
                if let Some(session) = session_name {
                    println!("session: {session}");
                } else {
                    println!("project has no active session; it will be re-provisioned on the next queue tick");
                }
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(4, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else {
        let request = Request::RunEnqueue { spec_path: args.spec.clone(), project_path, plan: args.plan, force: args.force };
        match client.send(&request).await.map_err(ExitError::from)? {
            Response::ProjectEnqueued { project_id } => {
                println!("enqueued project {project_id}");
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(4, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    }
}

async fn find_project_id_for_path(client: &DaemonClient, project_path: &std::path::Path) -> Result<ProjectId> {
    match client.send(&Request::QueueList).await.map_err(ExitError::from)? {
        Response::Projects(projects) => projects
            .into_iter()
            .filter(|p| p.project_path == project_path)
            .max_by_key(|p| p.enqueued_at)
            .map(|p| p.id)
            .ok_or_else(|| anyhow!(ExitError::new(4, format!("no known project at {}", project_path.display())))),
        Response::Error { message } => Err(ExitError::new(4, message).into()),
        _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
    }
}
