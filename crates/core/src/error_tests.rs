// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    store_unavailable = { Error::StoreUnavailable("disk full".into()), "disk full" },
    invalid_method = { Error::InvalidMethod("FETCH".into()), "FETCH" },
    corrupted = { Error::CorruptedData("bad row".into()), "bad row" },
    transport = { Error::Transport(TransportError::Timeout), "timed out" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_attempts_decreased_display() {
    let err = Error::AttemptsDecreased {
        id: RequestId(7),
        from: 3,
        to: 1,
    };
    let msg = err.to_string();
    assert!(msg.contains("7"));
    assert!(msg.contains("from 3 to 1"));
}

#[test]
fn error_store_unavailable_has_hint() {
    let err = Error::StoreUnavailable("readonly".into());
    assert!(err.to_string().contains("hint:"));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
