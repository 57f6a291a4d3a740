// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc authorize` — spec.md §3/§4.9: lists and resolves the cross-role
//! approval requests the Health Monitor opens on an agent's behalf.

use anyhow::Result;
use clap::Args;

use orc_core::authorization::AuthorizationOutcome;
use orc_core::ids::AuthorizationId;
use orc_daemon::{Request, Response};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("authorize_op").required(true).args(["list", "approve", "deny"])))]
pub struct AuthorizeArgs {
    /// List authorization requests open against a session.
    #[arg(long, value_name = "SESSION")]
    pub list: Option<String>,

    /// Approve a pending request by id.
    #[arg(long, value_name = "AUTHORIZATION_ID")]
    pub approve: Option<String>,

    /// Deny a pending request by id.
    #[arg(long, value_name = "AUTHORIZATION_ID")]
    pub deny: Option<String>,

    /// Free-text resolution note delivered back to the blocked agent.
    #[arg(long, requires = "authorize_op")]
    pub note: Option<String>,
}

pub async fn handle(args: AuthorizeArgs) -> Result<()> {
    if let Some(session) = args.list {
        let client = DaemonClient::for_query().map_err(ExitError::from)?;
        match client.send(&Request::AuthorizationList { session }).await.map_err(ExitError::from)? {
            Response::Authorizations(authorizations) => {
                if authorizations.is_empty() {
                    println!("no open authorization requests");
                }
                for a in authorizations {
                    println!(
                        "{}  {:?}  {} -> {}  {:?}  {}",
                        a.id, a.priority, a.from_role, a.to_role, a.status, a.action
                    );
                }
                Ok(())
            }
            Response::Error { message } => Err(ExitError::new(4, message).into()),
            _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
        }
    } else if let Some(id) = args.approve {
        resolve(AuthorizationId::from(id), AuthorizationOutcome::Approved, args.note).await
    } else if let Some(id) = args.deny {
        resolve(AuthorizationId::from(id), AuthorizationOutcome::Denied, args.note).await
    } else {
        unreachable!("clap ArgGroup guarantees exactly one operation is set")
    }
}

async fn resolve(authorization_id: AuthorizationId, outcome: AuthorizationOutcome, note: Option<String>) -> Result<()> {
    let client = DaemonClient::for_action().await.map_err(ExitError::from)?;
    let request = Request::AuthorizationResolve { authorization_id, outcome, note };
    match client.send(&request).await.map_err(ExitError::from)? {
        Response::Ok => {
            println!("resolved");
            Ok(())
        }
        Response::Error { message } => Err(ExitError::new(3, message).into()),
        _ => Err(ExitError::new(4, "unexpected response from daemon".to_string()).into()),
    }
}
