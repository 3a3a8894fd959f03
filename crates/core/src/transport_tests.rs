// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the reqwest transport against a local mock server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::request::{Method, RequestId};
use chrono::Utc;
use std::collections::BTreeMap;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yare::parameterized;

fn queued(url: String, method: Method) -> QueuedRequest {
    QueuedRequest {
        id: RequestId(1),
        url,
        method,
        headers: BTreeMap::new(),
        body: None,
        enqueued_at: Utc::now(),
        attempts: 0,
        next_retry_at: None,
    }
}

#[parameterized(
    ok = { 200, true },
    created = { 201, true },
    no_content = { 204, true },
    redirect = { 304, false },
    client_error = { 404, false },
    server_error = { 500, false },
)]
fn response_success_is_2xx(status: u16, expected: bool) {
    assert_eq!(HttpResponse { status }.is_success(), expected);
}

#[tokio::test]
async fn sends_captured_method_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/echo"))
        .and(header("x-client", "courier-test"))
        .and(body_string("{\"x\":1}"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = queued(format!("{}/api/echo", server.uri()), Method::Post);
    request.headers.insert("x-client".into(), "courier-test".into());
    request.body = Some("{\"x\":1}".into());

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status, 201);
    assert!(response.is_success());
}

#[tokio::test]
async fn reports_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/items/3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let request = queued(format!("{}/items/3", server.uri()), Method::Delete);
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status, 503);
    assert!(!response.is_success());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let request = queued(format!("{}/slow", server.uri()), Method::Get);
    let transport = ReqwestTransport::new(Duration::from_millis(100)).unwrap();
    let err = transport.send(&request).await.unwrap_err();
    assert_eq!(err, TransportError::Timeout);
}

#[tokio::test]
async fn unreachable_host_is_request_error() {
    // Port 9 (discard) on localhost is expected to refuse connections
    let request = queued("http://127.0.0.1:9/".into(), Method::Get);
    let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
    let err = transport.send(&request).await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Request(_) | TransportError::Timeout
    ));
}

#[tokio::test]
async fn invalid_url_is_an_error() {
    let request = queued("not a url".into(), Method::Get);
    let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
    assert!(transport.send(&request).await.is_err());
}
