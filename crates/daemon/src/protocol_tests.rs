// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Cursor;

use super::*;

#[test]
fn encode_decode_round_trips_a_request() {
    let req = Request::Hello { version: "1.2.3".to_string() };
    let bytes = encode(&req).unwrap();
    let back: Request = decode(&bytes).unwrap();
    assert_eq!(req, back);
}

#[test]
fn encode_rejects_oversized_payloads() {
    #[derive(Serialize)]
    struct Huge {
        blob: Vec<u8>,
    }
    let huge = Huge { blob: vec![0u8; MAX_MESSAGE_SIZE + 1] };
    let err = encode(&huge).unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn read_message_reports_connection_closed_on_immediate_eof() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn write_then_read_message_round_trips_raw_bytes() {
    let mut buf = Vec::new();
    write_message(&mut buf, b"hello").await.unwrap();

    let mut cursor = Cursor::new(buf);
    let got = read_message(&mut cursor).await.unwrap();
    assert_eq!(got, b"hello");
}

#[tokio::test]
async fn read_message_rejects_a_length_prefix_over_the_limit() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&((MAX_MESSAGE_SIZE as u32) + 1).to_be_bytes());

    let mut cursor = Cursor::new(buf);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn read_request_times_out_when_nothing_arrives() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    // An empty reader yields EOF immediately rather than hanging, so this
    // exercises the ConnectionClosed path through the timeout wrapper.
    let err = read_request(&mut cursor, std::time::Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn write_response_round_trips_through_read_request_shaped_framing() {
    let response = Response::Status(StatusPayload {
        version: "0.1.0".to_string(),
        uptime_secs: 42,
        queued: 1,
        processing: None,
        pending_tasks: 0,
    });
    let mut buf = Vec::new();
    write_response(&mut buf, &response, DEFAULT_TIMEOUT).await.unwrap();

    let mut cursor = Cursor::new(buf);
    let bytes = read_message(&mut cursor).await.unwrap();
    let decoded: Response = decode(&bytes).unwrap();
    assert_eq!(decoded, response);
}
