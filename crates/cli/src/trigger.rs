// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery trigger: asks the host to run a drain as soon as plausible.
//!
//! Three mutually exclusive paths, in priority order:
//! 1. Register a named background sync with a host that drains on its own
//! 2. Post a drain message to a long-lived worker
//! 3. Drain in the foreground after a short delay, if online
//!
//! Which path applies is decided once, when the trigger is built. Failures in
//! paths 1 and 2 fall through to path 3; the trigger never returns an error.

use std::fmt;
use std::time::Duration;

use courier_core::DrainReport;

use crate::error::Result;

/// Host runtime services the trigger relies on.
pub trait Host: Send + Sync {
    /// Whether the host can run drains autonomously after a registration.
    fn supports_background_sync(&self) -> bool;

    /// Register interest in a background drain under `tag`.
    fn register_background_sync(&self, tag: &str) -> Result<()>;

    /// Whether a long-lived worker is reachable.
    fn has_worker(&self) -> bool;

    /// Ask the worker to run one drain pass now.
    fn post_drain_message(&self) -> Result<()>;

    /// Whether the network currently looks reachable.
    fn is_online(&self) -> bool;

    /// Wait `delay`, then run one drain pass in the caller's context.
    fn drain_in_foreground(&self, delay: Duration) -> Result<DrainReport>;
}

/// Delivery path available on the host, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Native,
    Worker,
    Foreground,
}

impl Capability {
    /// Pick the most capable path the host offers.
    pub fn detect<H: Host + ?Sized>(host: &H) -> Self {
        if host.supports_background_sync() {
            Capability::Native
        } else if host.has_worker() {
            Capability::Worker
        } else {
            Capability::Foreground
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Native => write!(f, "background sync"),
            Capability::Worker => write!(f, "worker"),
            Capability::Foreground => write!(f, "foreground"),
        }
    }
}

/// What happened when delivery was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Background sync registered under the tag.
    Registered { tag: String },
    /// The worker was asked to drain.
    Posted,
    /// A foreground drain ran.
    DrainedInForeground(DrainReport),
    /// Nothing could run now; the record waits for the next trigger.
    Deferred,
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOutcome::Registered { tag } => {
                write!(f, "background sync registered ({})", tag)
            }
            TriggerOutcome::Posted => write!(f, "handed to the delivery worker"),
            TriggerOutcome::DrainedInForeground(report) => write!(
                f,
                "drained: {} delivered, {} retrying, {} abandoned",
                report.delivered.len(),
                report.retried.len(),
                report.abandoned.len()
            ),
            TriggerOutcome::Deferred => write!(f, "queued; will be delivered when online"),
        }
    }
}

/// Something that can be asked to deliver queued requests.
pub trait DeliveryTrigger: Send + Sync {
    /// Best effort; never fails.
    fn request_delivery(&self) -> TriggerOutcome;
}

/// Trigger that runs the three delivery paths against a [`Host`].
pub struct HostTrigger<H: Host> {
    host: H,
    capability: Capability,
    sync_tag: String,
    foreground_delay: Duration,
}

impl<H: Host> HostTrigger<H> {
    /// Detect the host capability and build the trigger.
    pub fn detect(host: H, sync_tag: impl Into<String>, foreground_delay: Duration) -> Self {
        let capability = Capability::detect(&host);
        tracing::debug!(%capability, "delivery capability detected");
        HostTrigger {
            host,
            capability,
            sync_tag: sync_tag.into(),
            foreground_delay,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn foreground(&self) -> TriggerOutcome {
        if !self.host.is_online() {
            tracing::debug!("offline, deferring delivery");
            return TriggerOutcome::Deferred;
        }
        match self.host.drain_in_foreground(self.foreground_delay) {
            Ok(report) => TriggerOutcome::DrainedInForeground(report),
            Err(e) => {
                tracing::warn!(error = %e, "foreground drain failed");
                TriggerOutcome::Deferred
            }
        }
    }
}

impl<H: Host> DeliveryTrigger for HostTrigger<H> {
    fn request_delivery(&self) -> TriggerOutcome {
        match self.capability {
            Capability::Native => match self.host.register_background_sync(&self.sync_tag) {
                Ok(()) => {
                    return TriggerOutcome::Registered {
                        tag: self.sync_tag.clone(),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, tag = %self.sync_tag, "background sync registration failed");
                }
            },
            Capability::Worker => match self.host.post_drain_message() {
                Ok(()) => return TriggerOutcome::Posted,
                Err(e) => tracing::warn!(error = %e, "posting drain message failed"),
            },
            Capability::Foreground => {}
        }
        self.foreground()
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
