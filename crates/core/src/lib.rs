// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! courier-core: durable offline HTTP request queue
//!
//! This crate provides the queued request model, the SQLite-backed queue
//! store, the backoff policy, and the drainer used by both the `courier` CLI
//! and the `courierd` worker daemon.

pub mod backoff;
pub mod clock;
pub mod drain;
pub mod error;
pub mod request;
pub mod store;
pub mod transport;

pub use backoff::{BackoffPolicy, FixedJitter, JitterSource, NoJitter, RandomJitter, RetryDecision};
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use drain::{
    transition, AbandonedRequest, CommitError, DeliveryOutcome, DrainReport, Drainer,
    RetryScheduled, Transition, DEFAULT_BATCH_SIZE,
};
pub use error::{Error, Result};
pub use request::{Method, NewRequest, QueuedRequest, RequestId};
pub use store::{QueueStats, QueueStore};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
