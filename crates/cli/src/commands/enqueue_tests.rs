// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::Utc;
use courier_core::{QueuedRequest, RequestId};
use std::collections::BTreeMap;
use yare::parameterized;

#[parameterized(
    simple = { "Content-Type: application/json", "Content-Type", "application/json" },
    no_space = { "X-Trace:1", "X-Trace", "1" },
    colon_in_value = { "Authorization: Basic a:b", "Authorization", "Basic a:b" },
    empty_value = { "X-Empty:", "X-Empty", "" },
)]
fn parse_valid_headers(raw: &str, name: &str, value: &str) {
    assert_eq!(parse_header(raw).unwrap(), (name.to_string(), value.to_string()));
}

#[parameterized(
    no_colon = { "Content-Type application/json" },
    empty_name = { ": value" },
    space_in_name = { "Content Type: text/plain" },
)]
fn parse_invalid_headers(raw: &str) {
    assert!(matches!(parse_header(raw), Err(Error::InvalidHeader(_))));
}

#[test]
fn build_request_collects_headers_and_body() {
    let request = build_request(
        "https://example.com/api/echo".into(),
        Method::Post,
        &["Content-Type: application/json".into(), "X-A: 1".into()],
        Some("{\"x\":1}".into()),
    )
    .unwrap();

    assert_eq!(request.method, Method::Post);
    assert_eq!(request.headers.len(), 2);
    assert_eq!(request.headers["X-A"], "1");
    assert_eq!(request.body.as_deref(), Some("{\"x\":1}"));
}

fn enqueued(outcome: TriggerOutcome) -> Enqueued {
    Enqueued {
        request: QueuedRequest {
            id: RequestId(7),
            url: "https://example.com/api/echo".into(),
            method: Method::Post,
            headers: BTreeMap::new(),
            body: None,
            enqueued_at: Utc::now(),
            attempts: 0,
            next_retry_at: None,
        },
        outcome,
    }
}

#[test]
fn text_output_mentions_id_and_outcome() {
    let text = render(&enqueued(TriggerOutcome::Deferred), OutputFormat::Text).unwrap();
    assert!(text.starts_with("Queued 7 POST https://example.com/api/echo"));
    assert!(text.contains("queued; will be delivered when online"));
}

#[parameterized(
    registered = { TriggerOutcome::Registered { tag: "courier-sync".into() }, "registered" },
    posted = { TriggerOutcome::Posted, "posted" },
    deferred = { TriggerOutcome::Deferred, "deferred" },
)]
fn json_output_names_delivery_path(outcome: TriggerOutcome, kind: &str) {
    let json = render(&enqueued(outcome), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["method"], "POST");
    assert_eq!(value["delivery"], kind);
}
