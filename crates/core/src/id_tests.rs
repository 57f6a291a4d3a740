// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

define_id! {
    pub struct TestId;
}

#[test]
fn short_truncates() {
    let id = TestId::new("abcdefghij");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefghij");
}

#[test]
fn display_matches_inner() {
    let id = TestId::new("widget-1");
    assert_eq!(id.to_string(), "widget-1");
}

#[test]
fn sequential_id_gen_is_deterministic() {
    let gen = SequentialIdGen::new("task");
    assert_eq!(gen.next(), "task-1");
    assert_eq!(gen.next(), "task-2");
    assert_eq!(gen.next(), "task-3");
}

#[test]
fn sequential_id_gen_clones_share_counter() {
    let gen = SequentialIdGen::new("t");
    let clone = gen.clone();
    assert_eq!(gen.next(), "t-1");
    assert_eq!(clone.next(), "t-2");
}

#[test]
fn uuid_id_gen_produces_unique_values() {
    let gen = UuidIdGen;
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
}

#[test]
fn ids_order_lexicographically() {
    let a = TestId::new("a");
    let b = TestId::new("b");
    assert!(a < b);
}
