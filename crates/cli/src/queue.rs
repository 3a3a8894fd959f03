// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Enqueue API: durable capture of outbound requests.
//!
//! [`OfflineQueue::enqueue`] commits the request to the store before it
//! returns, then asks the delivery trigger to run a drain. A trigger that
//! cannot deliver right now never undoes the enqueue.

use std::collections::BTreeMap;
use std::sync::Arc;

use courier_core::{NewRequest, QueueStats, QueueStore, QueuedRequest, RequestId};

use reqwest::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::trigger::{DeliveryTrigger, TriggerOutcome};

/// Result of a successful enqueue.
#[derive(Debug, Clone)]
pub struct Enqueued {
    pub request: QueuedRequest,
    pub outcome: TriggerOutcome,
}

/// Offline request queue over an injected store and trigger.
pub struct OfflineQueue<T: DeliveryTrigger> {
    store: Arc<QueueStore>,
    trigger: T,
}

impl<T: DeliveryTrigger> OfflineQueue<T> {
    pub fn new(store: Arc<QueueStore>, trigger: T) -> Self {
        OfflineQueue { store, trigger }
    }

    /// Durably queue `request`, then request delivery.
    ///
    /// Fails only if the request is malformed or cannot be stored. With a
    /// [`HostTrigger`](crate::trigger::HostTrigger) on the foreground path the
    /// drain blocks the caller; from async code, run this on a blocking thread.
    pub fn enqueue(&self, request: NewRequest) -> Result<RequestId> {
        Ok(self.enqueue_with_outcome(request)?.request.id)
    }

    /// Like [`enqueue`](Self::enqueue), also reporting what the trigger did.
    pub fn enqueue_with_outcome(&self, request: NewRequest) -> Result<Enqueued> {
        validate_url(&request.url)?;
        validate_headers(&request.headers)?;

        let request = self.store.add(&request)?;
        tracing::debug!(id = %request.id, method = %request.method, url = %request.url, "queued");

        let outcome = self.trigger.request_delivery();
        tracing::debug!(id = %request.id, %outcome, "delivery requested");

        Ok(Enqueued { request, outcome })
    }

    /// Queued requests, oldest first, at most `limit` of them.
    pub fn pending(&self, limit: Option<usize>) -> Result<Vec<QueuedRequest>> {
        let requests = match limit {
            Some(limit) => self.store.get_oldest(limit)?,
            None => self.store.get_all()?,
        };
        Ok(requests)
    }

    pub fn stats(&self) -> Result<QueueStats> {
        Ok(self.store.stats(self.store.now())?)
    }

    /// Drop every queued request. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.store.clear()?;
        if removed > 0 {
            tracing::info!(removed, "queue cleared");
        }
        Ok(removed)
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }
}

/// Only absolute `http`/`https` URLs can be delivered.
pub fn validate_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::InvalidRequest(format!("invalid url '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::InvalidRequest(format!(
            "unsupported url scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// Every header must be sendable as-is, or the record could never be delivered.
pub fn validate_headers(headers: &BTreeMap<String, String>) -> Result<()> {
    for (name, value) in headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err()
            || HeaderValue::from_str(value).is_err()
        {
            return Err(Error::InvalidHeader(format!("{}: {}", name, value)));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
