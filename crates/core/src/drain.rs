// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue drainer: delivers the oldest queued requests.
//!
//! One drain pass:
//! 1. Fetches a bounded batch of the oldest records
//! 2. Skips records whose retry time has not elapsed
//! 3. Sends each remaining record, oldest first
//! 4. Removes delivered records; re-stamps or abandons failed ones
//!
//! The retry bookkeeping is a pure [`transition`] from a record and a
//! delivery outcome to the next state; [`Drainer`] then commits that state
//! to the store. A failure on one record never stops the rest of the batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backoff::{BackoffPolicy, JitterSource, RandomJitter};
use crate::clock::{ClockSource, SystemClock};
use crate::error::Result;
use crate::request::{Method, QueuedRequest, RequestId};
use crate::store::QueueStore;
use crate::transport::HttpTransport;

/// Default number of records fetched per drain pass.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server answered with a 2xx status.
    Delivered { status: u16 },
    /// Non-2xx response or transport failure.
    Failed { reason: String },
}

/// Next state of a record after a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Delivered; the record must be removed.
    Delivered,
    /// Failed; the record must be written back with the new retry state.
    Retry(QueuedRequest),
    /// Failed with the retry budget spent; the record must be removed.
    Abandoned(QueuedRequest),
}

/// Compute the next state of `record` after `outcome`.
pub fn transition<J: JitterSource + ?Sized>(
    record: &QueuedRequest,
    outcome: &DeliveryOutcome,
    policy: &BackoffPolicy,
    now: DateTime<Utc>,
    jitter: &J,
) -> Transition {
    match outcome {
        DeliveryOutcome::Delivered { .. } => Transition::Delivered,
        DeliveryOutcome::Failed { .. } => {
            let mut next = record.clone();
            next.attempts = record.attempts.saturating_add(1);

            let decision = policy.compute_next_retry(next.attempts, now, jitter);
            next.next_retry_at = decision.next_retry_at;
            if decision.give_up {
                Transition::Abandoned(next)
            } else {
                Transition::Retry(next)
            }
        }
    }
}

/// A record scheduled for another attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryScheduled {
    pub id: RequestId,
    pub attempts: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub reason: String,
}

/// A record removed after exhausting its retry budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedRequest {
    pub id: RequestId,
    pub url: String,
    pub method: Method,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub reason: String,
}

/// A record whose new state could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitError {
    pub id: RequestId,
    pub message: String,
}

/// Summary of one drain pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DrainReport {
    /// Attempted in this order.
    pub attempted: Vec<RequestId>,
    pub delivered: Vec<RequestId>,
    pub retried: Vec<RetryScheduled>,
    pub abandoned: Vec<AbandonedRequest>,
    /// Not yet eligible; left untouched.
    pub skipped: Vec<RequestId>,
    pub errors: Vec<CommitError>,
}

impl DrainReport {
    /// Returns true if the pass touched nothing.
    pub fn is_empty(&self) -> bool {
        self.attempted.is_empty() && self.skipped.is_empty() && self.abandoned.is_empty()
    }
}

/// Delivers queued requests through a transport.
pub struct Drainer<T: HttpTransport, C: ClockSource = SystemClock, J: JitterSource = RandomJitter> {
    store: Arc<QueueStore<C>>,
    transport: T,
    policy: BackoffPolicy,
    jitter: J,
    batch_size: usize,
}

impl<T: HttpTransport, C: ClockSource> Drainer<T, C, RandomJitter> {
    /// Create a drainer with random jitter.
    pub fn new(store: Arc<QueueStore<C>>, transport: T, policy: BackoffPolicy) -> Self {
        Self::with_jitter(store, transport, policy, RandomJitter)
    }
}

impl<T: HttpTransport, C: ClockSource, J: JitterSource> Drainer<T, C, J> {
    /// Create a drainer with a custom jitter source.
    pub fn with_jitter(
        store: Arc<QueueStore<C>>,
        transport: T,
        policy: BackoffPolicy,
        jitter: J,
    ) -> Self {
        Drainer {
            store,
            transport,
            policy,
            jitter,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many records one pass fetches.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The backoff policy in use.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Run one drain pass.
    ///
    /// Only a failure to read the batch fails the pass. Per-record failures
    /// are logged and collected in the report.
    pub async fn drain(&self) -> Result<DrainReport> {
        let batch = self.store.get_oldest(self.batch_size)?;
        let now = self.store.now();
        let mut report = DrainReport::default();

        for record in batch {
            if !record.is_eligible(now) {
                tracing::debug!(
                    id = %record.id,
                    next_retry_at = ?record.next_retry_at,
                    "not yet eligible"
                );
                report.skipped.push(record.id);
                continue;
            }

            // Budget lowered since the record was last attempted
            if self.policy.is_exhausted(record.attempts) {
                let reason = "retry budget exhausted".to_string();
                let next = Transition::Abandoned(record.clone());
                self.commit(&record, next, &reason, &mut report);
                continue;
            }

            report.attempted.push(record.id);
            let outcome = self.attempt(&record).await;
            let reason = match &outcome {
                DeliveryOutcome::Delivered { status } => format!("HTTP {status}"),
                DeliveryOutcome::Failed { reason } => reason.clone(),
            };
            let next = transition(
                &record,
                &outcome,
                &self.policy,
                self.store.now(),
                &self.jitter,
            );
            self.commit(&record, next, &reason, &mut report);
        }

        if !report.is_empty() {
            tracing::info!(
                delivered = report.delivered.len(),
                retried = report.retried.len(),
                abandoned = report.abandoned.len(),
                skipped = report.skipped.len(),
                errors = report.errors.len(),
                "drain pass complete"
            );
        }

        Ok(report)
    }

    async fn attempt(&self, record: &QueuedRequest) -> DeliveryOutcome {
        tracing::debug!(id = %record.id, method = %record.method, url = %record.url, "delivering");
        match self.transport.send(record).await {
            Ok(response) if response.is_success() => DeliveryOutcome::Delivered {
                status: response.status,
            },
            Ok(response) => DeliveryOutcome::Failed {
                reason: format!("HTTP {}", response.status),
            },
            Err(e) => DeliveryOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    fn commit(
        &self,
        record: &QueuedRequest,
        next: Transition,
        reason: &str,
        report: &mut DrainReport,
    ) {
        let result = match next {
            Transition::Delivered => self.store.remove(record.id).map(|_| {
                tracing::debug!(id = %record.id, "delivered");
                report.delivered.push(record.id);
            }),
            Transition::Retry(next) => self
                .store
                .update(record.id, |r| {
                    r.attempts = next.attempts;
                    r.next_retry_at = next.next_retry_at;
                })
                .map(|updated| {
                    if updated.is_none() {
                        // Removed by a concurrent drain pass
                        tracing::debug!(id = %record.id, "record gone before retry was recorded");
                        return;
                    }
                    tracing::warn!(
                        id = %record.id,
                        attempts = next.attempts,
                        next_retry_at = ?next.next_retry_at,
                        reason,
                        "delivery failed, will retry"
                    );
                    report.retried.push(RetryScheduled {
                        id: record.id,
                        attempts: next.attempts,
                        next_retry_at: next.next_retry_at,
                        reason: reason.to_string(),
                    });
                }),
            Transition::Abandoned(next) => self.store.remove(record.id).map(|_| {
                tracing::error!(
                    id = %record.id,
                    method = %record.method,
                    url = %record.url,
                    attempts = next.attempts,
                    enqueued_at = %record.enqueued_at,
                    reason,
                    "delivery abandoned"
                );
                report.abandoned.push(AbandonedRequest {
                    id: record.id,
                    url: record.url.clone(),
                    method: record.method,
                    attempts: next.attempts,
                    enqueued_at: record.enqueued_at,
                    reason: reason.to_string(),
                });
            }),
        };

        if let Err(e) = result {
            tracing::warn!(id = %record.id, error = %e, "failed to record delivery outcome");
            report.errors.push(CommitError {
                id: record.id,
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
