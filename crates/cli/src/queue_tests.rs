// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use courier_core::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use yare::parameterized;

/// Trigger that counts calls and always defers.
#[derive(Default)]
struct CountingTrigger {
    calls: AtomicUsize,
}

impl DeliveryTrigger for CountingTrigger {
    fn request_delivery(&self) -> TriggerOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        TriggerOutcome::Deferred
    }
}

fn queue() -> OfflineQueue<CountingTrigger> {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    OfflineQueue::new(store, CountingTrigger::default())
}

#[test]
fn enqueue_into_empty_store() {
    let q = queue();

    let enqueued = q
        .enqueue_with_outcome(
            NewRequest::new("https://example.com/api/echo")
                .method(Method::Post)
                .body("{\"x\":1}"),
        )
        .unwrap();

    assert_eq!(enqueued.outcome, TriggerOutcome::Deferred);
    let pending = q.pending(None).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, enqueued.request.id);
    assert_eq!(pending[0].url, "https://example.com/api/echo");
    assert_eq!(pending[0].method, Method::Post);
    assert_eq!(pending[0].body.as_deref(), Some("{\"x\":1}"));
    assert_eq!(pending[0].attempts, 0);
}

#[test]
fn each_enqueue_requests_delivery() {
    let q = queue();
    let a = q.enqueue(NewRequest::new("https://example.com/a")).unwrap();
    let b = q.enqueue(NewRequest::new("https://example.com/b")).unwrap();

    assert!(a < b);

    assert_eq!(q.trigger().calls.load(Ordering::SeqCst), 2);
    assert_eq!(q.stats().unwrap().total, 2);
}

#[parameterized(
    relative = { "/api/echo" },
    ftp = { "ftp://example.com/file" },
    garbage = { "not a url" },
    empty = { "" },
)]
fn invalid_url_is_rejected_and_not_stored(url: &str) {
    let q = queue();

    let err = q.enqueue(NewRequest::new(url)).unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(q.pending(None).unwrap().is_empty());
    assert_eq!(q.trigger().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn clear_removes_everything() {
    let q = queue();
    q.enqueue(NewRequest::new("https://example.com/a")).unwrap();
    q.enqueue(NewRequest::new("https://example.com/b")).unwrap();

    assert_eq!(q.clear().unwrap(), 2);
    assert!(q.pending(None).unwrap().is_empty());
    assert_eq!(q.clear().unwrap(), 0);
}

#[parameterized(
    http = { "http://localhost:8080/x" },
    https = { "https://example.com/api?q=1" },
)]
fn valid_urls(url: &str) {
    assert!(validate_url(url).is_ok());
}

#[parameterized(
    non_ascii_value = { "X-Name", "café" },
    space_in_name = { "Bad Name", "x" },
    empty_name = { "", "x" },
    newline_in_value = { "X-Note", "a\nb" },
)]
fn unsendable_header_is_rejected_before_storing(name: &str, value: &str) {
    let q = queue();

    let err = q
        .enqueue(NewRequest::new("https://example.com/a").header(name, value))
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeader(_)));
    assert!(q.store().is_empty().unwrap());
    assert_eq!(q.trigger().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sendable_headers_are_kept() {
    let q = queue();

    q.enqueue(
        NewRequest::new("https://example.com/a")
            .header("Content-Type", "application/json")
            .header("X-Trace", "abc-123"),
    )
    .unwrap();

    let pending = q.pending(None).unwrap();
    assert_eq!(pending[0].headers["X-Trace"], "abc-123");
}

#[test]
fn pending_with_limit_returns_oldest() {
    let q = queue();
    let a = q.enqueue(NewRequest::new("https://example.com/a")).unwrap();
    let b = q.enqueue(NewRequest::new("https://example.com/b")).unwrap();
    q.enqueue(NewRequest::new("https://example.com/c")).unwrap();

    let ids: Vec<RequestId> = q.pending(Some(2)).unwrap().iter().map(|r| r.id).collect();

    assert_eq!(ids, vec![a, b]);
    assert_eq!(q.stats().unwrap().total, 3);
}
