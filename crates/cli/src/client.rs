// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin IPC client the CLI uses to talk to `orcd` over its Unix socket,
//! plus the auto-start dance so an operator never has to run the daemon
//! by hand first.

use std::path::PathBuf;

use thiserror::Error;
use tokio::net::UnixStream;

use orc_daemon::protocol::{self, ProtocolError};
use orc_daemon::{Request, Response};

use crate::daemon_process::{cleanup_stale_socket, connect_with_retry, daemon_socket, probe_socket, start_daemon_background};
use crate::env;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("orcd is not running")]
    DaemonNotRunning,
    #[error("failed to start orcd: {0}")]
    DaemonStartFailed(String),
    #[error("timed out waiting for orcd to start")]
    DaemonStartTimeout,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("daemon rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine a state directory")]
    NoStateDir,
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// For commands that mutate orchestrator state (`run`, `queue --add`,
    /// `scheduler --add`, ...): connect, auto-starting `orcd` in the
    /// background if no socket is present yet.
    pub async fn for_action() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;
        if probe_socket(&socket_path) {
            return Ok(Self { socket_path });
        }
        cleanup_stale_socket()?;
        if probe_socket(&socket_path) {
            return Ok(Self { socket_path });
        }
        let child = start_daemon_background()?;
        connect_with_retry(env::timeout_connect(), child, &socket_path)?;
        Ok(Self { socket_path })
    }

    /// For read-only commands (`queue --list`, `queue --status`, ...):
    /// never start a daemon just to find it has nothing to report.
    pub fn for_query() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;
        if !probe_socket(&socket_path) {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();
        let data = protocol::encode(request)?;
        let timeout = env::timeout_ipc();
        tokio::time::timeout(timeout, protocol::write_message(&mut writer, &data)).await.map_err(|_| ProtocolError::Timeout)??;
        let bytes = tokio::time::timeout(timeout, protocol::read_message(&mut reader)).await.map_err(|_| ProtocolError::Timeout)??;
        Ok(protocol::decode(&bytes)?)
    }

    pub async fn send_ok(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}
