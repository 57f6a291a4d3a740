// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use orc_adapters::{FakeSessionAdapter, SessionTarget};
use orc_core::clock::FakeClock;

use super::*;

fn fast_config() -> MessengerConfig {
    MessengerConfig {
        max_attempts: 3,
        verify_delay: Duration::ZERO,
        allow_ctrl_c: false,
        verify_lines: 50,
        prompt_indicators: vec!["$ ".to_string()],
        journal_path: None,
    }
}

#[tokio::test]
async fn self_send_is_a_no_op() {
    let session = FakeSessionAdapter::new();
    let messenger = TmuxMessenger::new(session.clone(), FakeClock::default(), fast_config());
    let target = SessionTarget::new("proj", 0);

    let outcome = messenger.send(Some(&target), &target, "hello").await.unwrap();

    assert_eq!(outcome, SendOutcome::SelfSend);
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn dead_target_is_rejected() {
    let session = FakeSessionAdapter::new();
    let messenger = TmuxMessenger::new(session, FakeClock::default(), fast_config());
    let target = SessionTarget::new("nonexistent", 0);

    let err = messenger.send(None, &target, "hello").await.unwrap_err();

    assert!(matches!(err, MessengerError::DeadTarget(_)));
}

#[tokio::test]
async fn delivers_and_verifies_on_first_attempt() {
    let session = FakeSessionAdapter::new();
    session.create_session("proj", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("proj", 0);
    session.set_pane_content(&target, vec!["$ ".to_string()]);

    let messenger = TmuxMessenger::new(session.clone(), FakeClock::default(), fast_config());
    let outcome = messenger.send(None, &target, "hello").await.unwrap();

    assert_eq!(outcome, SendOutcome::Delivered { attempts: 1 });
    assert!(session.calls().iter().any(|c| matches!(c, orc_adapters::SessionCall::SendLiteral { text, .. } if text == "hello")));
}

#[tokio::test]
async fn verification_failure_retries_up_to_the_cap_then_errors() {
    let session = FakeSessionAdapter::new();
    session.create_session("proj", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("proj", 0);
    // No prompt indicator ever appears in the pane, so verification never succeeds.

    let config = MessengerConfig { max_attempts: 2, ..fast_config() };
    let messenger = TmuxMessenger::new(session.clone(), FakeClock::default(), config);

    let err = messenger.send(None, &target, "hello").await.unwrap_err();

    match err {
        MessengerError::VerificationFailed { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected VerificationFailed, got {other:?}"),
    }
    let send_count = session.calls().iter().filter(|c| matches!(c, orc_adapters::SessionCall::SendLiteral { .. })).count();
    assert_eq!(send_count, 2);
}

#[tokio::test]
async fn slash_command_is_split_into_two_transmissions() {
    let session = FakeSessionAdapter::new();
    session.create_session("proj", Path::new("/tmp")).await.unwrap();
    let target = SessionTarget::new("proj", 0);
    session.set_pane_content(&target, vec!["$ ".to_string()]);

    let messenger = TmuxMessenger::new(session.clone(), FakeClock::default(), fast_config());
    messenger.send(None, &target, "one more thing\n/compact").await.unwrap();

    let literals: Vec<String> = session
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            orc_adapters::SessionCall::SendLiteral { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(literals, vec!["one more thing".to_string(), "/compact".to_string()]);
}

#[test]
fn split_slash_command_separates_prose_from_command() {
    assert_eq!(split_slash_command("just prose"), (Some("just prose".to_string()), None));
    assert_eq!(split_slash_command("/compact"), (None, Some("/compact".to_string())));
    assert_eq!(
        split_slash_command("status update\n/compact"),
        (Some("status update".to_string()), Some("/compact".to_string()))
    );
}
