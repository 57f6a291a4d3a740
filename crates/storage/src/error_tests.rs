// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn illegal_transition_message_names_both_states() {
    let err = StoreError::IllegalTransition {
        from: "QUEUED".into(),
        to: "COMPLETED".into(),
    };
    assert_eq!(err.to_string(), "illegal transition: QUEUED -> COMPLETED");
}

#[test]
fn schema_mismatch_message_names_both_versions() {
    let err = StoreError::SchemaMismatch { found: 1, expected: 2 };
    assert!(err.to_string().contains('1'));
    assert!(err.to_string().contains('2'));
}
