// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc scheduler` — spec.md §6/C1: manages recurring tasks dispatched
//! into already-running sessions (status checks, nudges, periodic review).

use anyhow::Result;
use clap::Args;

use orc_core::ids::{Role, TaskId};
use orc_daemon::{Request, Response};

use crate::client::DaemonClient;
use crate::daemon_process::{daemon_socket, probe_socket, start_daemon_background};
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("scheduler_op").required(true).args(["daemon", "list", "add", "remove"])))]
pub struct SchedulerArgs {
    /// Ensure `orcd` is running in the background and report its status.
    #[arg(long)]
    pub daemon: bool,

    /// List recurring tasks for a session.
    #[arg(long, value_name = "SESSION")]
    pub list: Option<String>,

    /// Add a recurring task: SESSION ROLE WINDOW MINUTES NOTE.
    #[arg(long, num_args = 5, value_names = ["SESSION", "ROLE", "WINDOW", "MINUTES", "NOTE"])]
    pub add: Option<Vec<String>>,

    /// With `--add`, deliver once after MINUTES and delete the task rather
    /// than recur (spec.md:50's `ScheduledTask.one_shot`).
    #[arg(long, requires = "add")]
    pub one_shot: bool,

    /// Remove a recurring task by id.
    #[arg(long, value_name = "TASK_ID")]
    pub remove: Option<String>,
}

pub async fn handle(args: SchedulerArgs) -> Result<()> {
    if args.daemon {
        let socket_path = daemon_socket().map_err(ExitError::from)?;
        if probe_socket(&socket_path) {
            println!("orcd already running");
            return Ok(());
        }
        let child = start_daemon_background().map_err(ExitError::from)?;
        crate::daemon_process::connect_with_retry(crate::env::timeout_connect(), child, &socket_path).map_err(ExitError::from)?;
        println!("orcd started");
        Ok(())
    } else if let Some(session) = args.list {
        let client = DaemonClient::for_query().map_err(ExitError::from)?;
        match client.send(&Request::SchedulerList { session }).await.map_err(ExitError::from)? {
            Response::Tasks(tasks) => {
                if tasks.is_empty() {
                    println!("no recurring tasks");
                }
                for t in tasks {
                    let every = t.interval_minutes.map(|m| format!("{m}m")).unwrap_or_else(|| "one-shot".to_string());
                    println!("{}  target={}  every={}  next_due={}  {:?}  {}", t.id, t.target, every, t.next_run_epoch, t.status, t.message);
                }
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(4, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else if let Some(fields) = args.add {
        let [session, role, window, minutes, note] = <[String; 5]>::try_from(fields).map_err(|_| ExitError::new(2, "--add takes exactly 5 values".to_string()))?;
        let window: u32 = window.parse().map_err(|_| ExitError::new(2, "WINDOW must be an integer".to_string()))?;
        let interval_minutes: u32 = minutes.parse().map_err(|_| ExitError::new(2, "MINUTES must be an integer".to_string()))?;
        let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
        let request = Request::SchedulerAdd { session, role: Role::from(role), window, interval_minutes, note, one_shot: args.one_shot };
        match client.send(&request).await.map_err(ExitError::from)? {
            Response::TaskAdded { task_id } => {
                println!("added task {task_id}");
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(3, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else if let Some(id) = args.remove {
        let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
        client.send_ok(&Request::SchedulerRemove { task_id: TaskId::from(id) }).await.map_err(ExitError::from)?;
        println!("removed");
        Ok(())
    } else {
        unreachable!("clap ArgGroup guarantees exactly one operation is set")
    }
}
