// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `orc` and `orcd`.
//!
//! Wire format: 4-byte big-endian length prefix + JSON payload, the same
//! shape this corpus's daemon-plus-CLI systems all use. spec.md's CLI
//! surface (§6) is a thin `Request`/`Response` pair over this transport;
//! neither subcommand flags nor exit codes live in this module — those
//! belong to the CLI binary, which maps a `Response` to one.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use orc_core::authorization::{Authorization, AuthorizationOutcome};
use orc_core::ids::{AuthorizationId, ProjectId, Role, TaskId};
use orc_core::project::{Plan, Project};
use orc_core::task::ScheduledTask;

use crate::supervisor::MergeReport;

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check; also used to verify the daemon is the right version.
    Hello { version: String },
    Status,
    RunEnqueue { spec_path: PathBuf, project_path: PathBuf, plan: Plan, force: bool },
    RunResume { project_id: ProjectId },
    QueueList,
    QueueStatus { project_id: ProjectId },
    QueueReset { project_id: ProjectId },
    QueueRemove { project_id: ProjectId },
    SchedulerList { session: String },
    SchedulerAdd { session: String, role: Role, window: u32, interval_minutes: u32, note: String, one_shot: bool },
    SchedulerRemove { task_id: TaskId },
    AuthorizationList { session: String },
    AuthorizationResolve { authorization_id: AuthorizationId, outcome: AuthorizationOutcome, note: Option<String> },
    Merge { project_path: PathBuf, branch: String, dry_run: bool },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Hello { version: String },
    Status(StatusPayload),
    ProjectEnqueued { project_id: ProjectId },
    ProjectResumed { project_id: ProjectId, session_name: Option<String> },
    Projects(Vec<Project>),
    Project(Project),
    Ok,
    Tasks(Vec<ScheduledTask>),
    TaskAdded { task_id: TaskId },
    Authorizations(Vec<Authorization>),
    MergeResult(MergeReport),
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusPayload {
    pub version: String,
    pub uptime_secs: u64,
    pub queued: usize,
    pub processing: Option<ProjectId>,
    pub pending_tasks: usize,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timeout")]
    Timeout,
}

pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: json.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(json)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn read_message<R: tokio::io::AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(ProtocolError::ConnectionClosed),
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

pub async fn write_message<W: tokio::io::AsyncWriteExt + Unpin>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError> {
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R: tokio::io::AsyncReadExt + Unpin>(reader: &mut R, timeout: std::time::Duration) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader)).await.map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

pub async fn write_response<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data)).await.map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
