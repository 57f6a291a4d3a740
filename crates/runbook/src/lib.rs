// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Team composition and agent briefing content (spec.md §4.5, §4.6 step 2).
//!
//! This crate carries no operator-authored DSL — the teacher's HCL runbook
//! language had no counterpart in this project's scope, since there is no
//! user-defined pipeline/step grammar here, only a fixed set of role
//! briefing templates and default team tables keyed by subscription plan.
//! What survives from the teacher is the *shape*: an `IndexMap`-ordered
//! role table, a `${var}` template interpolator, and a `toml`-backed
//! on-disk default for values an operator may reasonably override.

mod briefing;
mod error;
mod roles;
mod spec_parser;
mod template;

pub use briefing::{compose_briefing, BriefingContext, PeerRef};
pub use error::RunbookError;
pub use roles::{default_team, RoleDef, Team};
pub use spec_parser::extract_team;
pub use template::interpolate;
