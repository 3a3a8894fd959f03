// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn queued(next_retry_at: Option<DateTime<Utc>>) -> QueuedRequest {
    QueuedRequest {
        id: RequestId(1),
        url: "https://example.com/api".into(),
        method: Method::Post,
        headers: BTreeMap::new(),
        body: None,
        enqueued_at: Utc.timestamp_millis_opt(0).unwrap(),
        attempts: 0,
        next_retry_at,
    }
}

#[parameterized(
    upper = { "POST", Method::Post },
    lower = { "delete", Method::Delete },
    mixed = { "Patch", Method::Patch },
    options = { "OPTIONS", Method::Options },
)]
fn method_parses_case_insensitively(input: &str, expected: Method) {
    assert_eq!(input.parse::<Method>().unwrap(), expected);
}

#[test]
fn method_rejects_unknown() {
    let err = "FETCH".parse::<Method>().unwrap_err();
    assert!(matches!(err, Error::InvalidMethod(m) if m == "FETCH"));
}

#[test]
fn method_defaults_to_get() {
    assert_eq!(Method::default(), Method::Get);
    assert_eq!(NewRequest::new("http://x").method, Method::Get);
}

#[test]
fn method_serializes_upper_case() {
    assert_eq!(serde_json::to_string(&Method::Put).unwrap(), "\"PUT\"");
}

#[test]
fn new_request_builder() {
    let req = NewRequest::new("https://example.com/api/echo")
        .method(Method::Post)
        .header("content-type", "application/json")
        .body("{\"x\":1}");

    assert_eq!(req.method, Method::Post);
    assert_eq!(req.headers.get("content-type").unwrap(), "application/json");
    assert_eq!(req.body.as_deref(), Some("{\"x\":1}"));
}

#[test]
fn new_request_deserializes_with_defaults() {
    let req: NewRequest = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
    assert_eq!(req.method, Method::Get);
    assert!(req.headers.is_empty());
    assert!(req.body.is_none());
}

#[test]
fn eligible_when_no_retry_time() {
    let now = Utc.timestamp_millis_opt(10_000).unwrap();
    assert!(queued(None).is_eligible(now));
}

#[test]
fn eligible_when_retry_time_elapsed() {
    let now = Utc.timestamp_millis_opt(10_000).unwrap();
    assert!(queued(Some(now)).is_eligible(now));
    let earlier = Utc.timestamp_millis_opt(9_999).unwrap();
    assert!(queued(Some(earlier)).is_eligible(now));
}

#[test]
fn not_eligible_before_retry_time() {
    let now = Utc.timestamp_millis_opt(10_000).unwrap();
    let later = Utc.timestamp_millis_opt(10_001).unwrap();
    assert!(!queued(Some(later)).is_eligible(now));
}

#[test]
fn request_id_display_and_parse() {
    assert_eq!(RequestId(42).to_string(), "42");
    assert_eq!("42".parse::<RequestId>().unwrap(), RequestId(42));
}
