// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small `${var}` interpolator, grounded on the teacher's template engine
//! shape but reduced to the one thing the briefer needs: substituting a
//! handful of named fields into a fixed template string. There is no
//! operator-authored template source in this project (spec.md never asks
//! for one), so conditionals/loops/includes from the teacher's richer
//! template language are not carried over — only the substitution step.

use std::collections::BTreeMap;

/// Replaces every `${name}` occurrence in `template` with `vars["name"]`.
/// An unresolved placeholder is left in place verbatim rather than erroring
/// — briefing text is operator-facing, not machine-parsed, so a missing
/// variable should be visible rather than silently blank.
pub fn interpolate(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_marker = &rest[start + 2..];
        match after_marker.find('}') {
            Some(end) => {
                let name = &after_marker[..end];
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after_marker[end + 1..];
            }
            None => {
                out.push_str("${");
                rest = after_marker;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
