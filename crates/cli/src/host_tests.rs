// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::connectivity::StaticConnectivity;
use crate::trigger::{DeliveryTrigger, HostTrigger, TriggerOutcome};
use courier_core::{Method, NewRequest};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_delivery() -> DeliveryConfig {
    DeliveryConfig {
        base_delay_ms: 10,
        max_jitter_ms: 0,
        request_timeout_secs: 5,
        ..Default::default()
    }
}

#[test]
fn without_daemon_only_foreground_is_available() {
    let dir = tempdir().unwrap();
    let store = Arc::new(QueueStore::open_in_memory().unwrap());

    let host = DaemonHost::new(
        dir.path().to_path_buf(),
        store,
        DeliveryConfig::default(),
        Box::new(StaticConnectivity(false)),
    );

    assert!(!host.supports_background_sync());
    assert!(!host.has_worker());
    assert!(!host.is_online());
    assert!(host.post_drain_message().is_err());
    assert!(host.register_background_sync("courier-sync").is_err());
}

#[test]
fn drain_now_delivers_and_retries() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    });

    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let ok = store
        .add(&NewRequest::new(format!("{}/ok", server.uri())).method(Method::Post))
        .unwrap()
        .id;
    let down = store
        .add(&NewRequest::new(format!("{}/down", server.uri())).method(Method::Post))
        .unwrap()
        .id;

    let report = drain_now(Arc::clone(&store), &fast_delivery(), Duration::ZERO).unwrap();

    assert_eq!(report.delivered, vec![ok]);
    assert_eq!(report.retried.len(), 1);
    assert_eq!(report.retried[0].id, down);
    assert!(store.get(ok).unwrap().is_none());
    assert_eq!(store.get(down).unwrap().unwrap().attempts, 1);
}

#[test]
fn foreground_drain_of_empty_queue() {
    let dir = tempdir().unwrap();
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let host = DaemonHost::new(
        dir.path().to_path_buf(),
        store,
        fast_delivery(),
        Box::new(StaticConnectivity(true)),
    );

    let report = host.drain_in_foreground(Duration::from_millis(5)).unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn drain_now_refuses_to_nest_in_a_runtime() {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    store.add(&NewRequest::new("http://127.0.0.1:9/never")).unwrap();

    let err = drain_now(Arc::clone(&store), &fast_delivery(), Duration::ZERO).unwrap_err();

    assert!(matches!(err, Error::Daemon(_)));
    assert_eq!(store.get_all().unwrap()[0].attempts, 0);
}

#[tokio::test]
async fn online_trigger_inside_a_runtime_defers() {
    let dir = tempdir().unwrap();
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let host = DaemonHost::new(
        dir.path().to_path_buf(),
        Arc::clone(&store),
        fast_delivery(),
        Box::new(StaticConnectivity(true)),
    );
    let trigger = HostTrigger::detect(host, "courier-sync", Duration::ZERO);

    assert_eq!(trigger.request_delivery(), TriggerOutcome::Deferred);
}
