// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;
use crate::protocol::Request;

#[tokio::test]
async fn write_then_read_message_round_trips() {
    let mut buf = Vec::new();
    write_message(&mut buf, b"hello").await.unwrap();
    let mut cursor = std::io::Cursor::new(buf);
    let got = read_message(&mut cursor).await.unwrap();
    assert_eq!(got, b"hello");
}

#[tokio::test]
async fn read_message_on_empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_message_is_rejected_on_write() {
    let huge = vec![0u8; MAX_MESSAGE_SIZE + 1];
    let mut buf = Vec::new();
    let err = write_message(&mut buf, &huge).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[test]
fn encode_decode_round_trips_a_request() {
    let req = Request::Status { running_only: false };
    let bytes = encode(&req).unwrap();
    let back: Request = decode(&bytes).unwrap();
    assert_eq!(req, back);
}
