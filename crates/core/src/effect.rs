// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects are side effects expressed as data, produced by the engine and
//! carried out by the executor layer against the adapter traits. Keeping
//! them as plain data (rather than closures) lets the engine's decision
//! logic stay synchronous and unit-testable without mocking I/O.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, Role, SessionName, TaskId};
use crate::project::ProjectStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    SendToSession {
        target: SessionName,
        message: String,
        task_id: Option<TaskId>,
    },
    CreateSession {
        session_name: SessionName,
        starting_dir: PathBuf,
    },
    NewWindow {
        session_name: SessionName,
        role: Role,
        starting_dir: PathBuf,
    },
    KillSession {
        session_name: SessionName,
        force: bool,
    },
    CapturePane {
        session_name: SessionName,
        window_index: u32,
        lines: u32,
    },
    CreateWorkspace {
        project_id: ProjectId,
        role: Role,
        parent_dir: PathBuf,
    },
    DeleteWorkspace {
        worktree: PathBuf,
    },
    SetTimer {
        task_id: TaskId,
        fire_at_epoch: i64,
    },
    CancelTimer {
        task_id: TaskId,
    },
    Notify {
        subject: String,
        body: String,
        attachments: Vec<PathBuf>,
    },
    TransitionProject {
        project_id: ProjectId,
        to: ProjectStatus,
    },
    RunGit {
        worktree: PathBuf,
        args: Vec<String>,
        timeout: Duration,
    },
    WriteReport {
        project_id: ProjectId,
        markdown: String,
    },
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
