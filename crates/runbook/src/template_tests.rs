// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn substitutes_every_placeholder() {
    let out = interpolate("Hello ${name}, you are ${role}.", &vars(&[("name", "Ada"), ("role", "developer")]));
    assert_eq!(out, "Hello Ada, you are developer.");
}

#[test]
fn leaves_unresolved_placeholder_verbatim() {
    let out = interpolate("Branch: ${branch}", &vars(&[]));
    assert_eq!(out, "Branch: ${branch}");
}

#[test]
fn unterminated_placeholder_is_left_as_is() {
    let out = interpolate("oops ${unterminated", &vars(&[]));
    assert_eq!(out, "oops ${unterminated");
}

#[test]
fn no_placeholders_is_identity() {
    let out = interpolate("plain text", &vars(&[("unused", "x")]));
    assert_eq!(out, "plain text");
}
