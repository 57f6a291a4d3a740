// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunbookError {
    #[error("specification names no roles and no default team exists for plan {plan:?}")]
    EmptyTeam { plan: String },
    #[error("role {role:?} is not a member of the briefed team")]
    RoleNotOnTeam { role: String },
}
