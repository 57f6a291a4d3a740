// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc queue` — spec.md §6/C8: inspects and manipulates the project
//! queue without going through `run`.

use anyhow::Result;
use clap::Args;

use orc_core::ids::ProjectId;
use orc_daemon::{Request, Response};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("queue_op").required(true).args(["list", "status", "reset", "remove"])))]
pub struct QueueArgs {
    /// List every project the daemon knows about, queued through terminal.
    #[arg(long)]
    pub list: bool,

    /// Show full detail for a single project.
    #[arg(long, value_name = "PROJECT_ID")]
    pub status: Option<String>,

    /// Move a FAILED project back to QUEUED, resetting its attempt count.
    #[arg(long, value_name = "PROJECT_ID")]
    pub reset: Option<String>,

    /// Drop a QUEUED project without ever starting it.
    #[arg(long, value_name = "PROJECT_ID")]
    pub remove: Option<String>,
}

pub async fn handle(args: QueueArgs) -> Result<()> {
    if args.list {
        let client = DaemonClient::for_query().map_err(ExitError::from)?;
        match client.send(&Request::QueueList).await.map_err(ExitError::from)? {
            Response::Projects(projects) => {
                if projects.is_empty() {
                    println!("queue is empty");
                }
                for p in projects {
                    println!(
                        "{}  {:?}  {}  attempts={}  {}",
                        p.id,
                        p.status,
                        p.project_path.display(),
                        p.attempts,
                        p.main_session.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
                    );
                }
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(4, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else if let Some(id) = args.status {
        let client = DaemonClient::for_query().map_err(ExitError::from)?;
        let project_id = ProjectId::from(id);
        match client.send(&Request::QueueStatus { project_id }).await.map_err(ExitError::from)? {
            Response::Project(p) => {
                println!("{}", serde_json::to_string_pretty(&p).map_err(|e| ExitError::new(4, e.to_string()))?);
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(3, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else if let Some(id) = args.reset {
        let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
        let project_id = ProjectId::from(id);
        client.send_ok(&Request::QueueReset { project_id }).await.map_err(ExitError::from)?;
        println!("reset");
        Ok(())
    } else if let Some(id) = args.remove {
        let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
        let project_id = ProjectId::from(id);
        client.send_ok(&Request::QueueRemove { project_id }).await.map_err(ExitError::from)?;
        println!("removed");
        Ok(())
    } else {
        unreachable!("clap ArgGroup guarantees exactly one operation is set")
    }
}
