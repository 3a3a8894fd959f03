// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::Utc;
use courier_core::{AbandonedRequest, CommitError, Method, RequestId, RetryScheduled};

#[test]
fn empty_report() {
    assert_eq!(
        render(&DrainReport::default(), OutputFormat::Text).unwrap(),
        "Nothing to deliver."
    );
}

#[test]
fn text_report_lists_retries_and_abandoned() {
    let report = DrainReport {
        attempted: vec![RequestId(1), RequestId(2), RequestId(3)],
        delivered: vec![RequestId(1)],
        retried: vec![RetryScheduled {
            id: RequestId(2),
            attempts: 1,
            next_retry_at: Some(Utc::now()),
            reason: "HTTP 503".into(),
        }],
        abandoned: vec![AbandonedRequest {
            id: RequestId(3),
            url: "https://example.com/gone".into(),
            method: Method::Delete,
            attempts: 5,
            enqueued_at: Utc::now(),
            reason: "HTTP 500".into(),
        }],
        skipped: vec![],
        errors: vec![CommitError { id: RequestId(2), message: "database is locked".into() }],
    };

    let text = render(&report, OutputFormat::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Delivered: 1, retrying: 1, abandoned: 1, skipped: 0");
    assert!(lines[1].starts_with("  retry 2 (attempt 1, next at "));
    assert!(lines[1].ends_with("HTTP 503"));
    assert_eq!(
        lines[2],
        "  abandoned 3 DELETE https://example.com/gone after 5 attempts: HTTP 500"
    );
    assert_eq!(lines[3], "  error 2: database is locked");
}

#[test]
fn json_report() {
    let report = DrainReport {
        attempted: vec![RequestId(4)],
        delivered: vec![RequestId(4)],
        ..Default::default()
    };
    let value: serde_json::Value =
        serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(value["delivered"], serde_json::json!([4]));
    assert_eq!(value["abandoned"], serde_json::json!([]));
}
