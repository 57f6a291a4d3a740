// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extracts team size/roles from the operator's specification text
//! (spec.md §4.6 step 2). The specification is free-form Markdown, not a
//! DSL, so this is a best-effort regex scan for a `roles:`/`team:` line or
//! a bullet list under a "Team" heading — anything more structured would
//! require the operator to write against a grammar, which spec.md never
//! asks for. Absence of a match falls back to the plan-tier default team.

use std::sync::LazyLock;

use orc_core::project::Plan;
use regex::Regex;

use crate::roles::{description, Team};

#[allow(clippy::expect_used)]
static ROLES_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(?:roles?|team)\s*:\s*(.+)$").expect("valid regex"));

#[allow(clippy::expect_used)]
static BULLET_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*[-*]\s*([a-z][a-z0-9_-]{1,30})\s*[:—-]").expect("valid regex"));

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '_'], "-")
}

fn build_from_names(names: impl Iterator<Item = String>) -> Team {
    let mut team = Team::new();
    let mut seen = std::collections::HashSet::new();
    for name in names {
        let name = normalize(&name);
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        let (title, responsibilities) = description(&name);
        team.push(name, title, responsibilities.into_iter().map(str::to_string).collect());
    }
    team
}

/// Parses `spec_text` for an explicit role list; falls back to the
/// plan-tier default team (spec.md §4.6 step 2) when none is found.
pub fn extract_team(spec_text: &str, plan: Plan) -> Team {
    if let Some(caps) = ROLES_LINE.captures(spec_text) {
        let names = caps[1].split(',').map(|s| s.to_string());
        let team = build_from_names(names);
        if !team.is_empty() {
            return team;
        }
    }

    // A "## Team" section with a role per bullet, e.g.:
    //   ## Team
    //   - developer: implements features
    //   - tester: writes tests
    if let Some(section_start) = spec_text.to_lowercase().find("## team") {
        let section = &spec_text[section_start..];
        let end = section[1..].find("\n#").map(|i| i + 1).unwrap_or(section.len());
        let bullets = &section[..end];
        let names: Vec<String> = BULLET_ROLE.captures_iter(bullets).map(|c| c[1].to_string()).collect();
        let team = build_from_names(names.into_iter());
        if !team.is_empty() {
            return team;
        }
    }

    crate::roles::default_team(plan)
}

#[cfg(test)]
#[path = "spec_parser_tests.rs"]
mod tests;
