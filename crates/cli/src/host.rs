// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`Host`]: the courierd worker daemon plus an in-process fallback.
//!
//! Capability comes from a `Hello` handshake performed once at construction:
//! a compatible daemon with background sync enabled is the native path, a
//! compatible daemon without it is the worker path, anything else leaves only
//! the foreground drain.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use courier_core::{DrainReport, Drainer, QueueStore, ReqwestTransport};

use crate::config::DeliveryConfig;
use crate::connectivity::Connectivity;
use crate::daemon::{self, DaemonClient, HandshakeResult};
use crate::error::{Error, Result};
use crate::trigger::Host;

/// Host backed by the courierd daemon for a state directory.
///
/// The foreground fallback blocks the calling thread. Inside an async
/// runtime it is unavailable and an online trigger defers instead.
pub struct DaemonHost {
    state_dir: PathBuf,
    store: Arc<QueueStore>,
    delivery: DeliveryConfig,
    connectivity: Box<dyn Connectivity>,
    handshake: HandshakeResult,
}

impl DaemonHost {
    /// Handshake with the daemon (if any) and build the host.
    pub fn new(
        state_dir: PathBuf,
        store: Arc<QueueStore>,
        delivery: DeliveryConfig,
        connectivity: Box<dyn Connectivity>,
    ) -> Self {
        let handshake = daemon::handshake_daemon(&state_dir);
        match &handshake {
            HandshakeResult::VersionMismatch { daemon_version } => tracing::warn!(
                daemon = %daemon_version,
                cli = daemon::CLI_VERSION,
                "ignoring daemon with a different version"
            ),
            HandshakeResult::Failed(reason) => {
                tracing::debug!(%reason, "no worker daemon available")
            }
            HandshakeResult::Compatible { .. } => {}
        }
        DaemonHost {
            state_dir,
            store,
            delivery,
            connectivity,
            handshake,
        }
    }

    fn client(&self) -> Result<DaemonClient> {
        DaemonClient::connect(&daemon::get_socket_path(&self.state_dir))
    }
}

impl Host for DaemonHost {
    fn supports_background_sync(&self) -> bool {
        matches!(
            self.handshake,
            HandshakeResult::Compatible {
                background_sync: true
            }
        )
    }

    fn register_background_sync(&self, tag: &str) -> Result<()> {
        self.client()?.register_sync(tag)
    }

    fn has_worker(&self) -> bool {
        matches!(self.handshake, HandshakeResult::Compatible { .. })
    }

    fn post_drain_message(&self) -> Result<()> {
        self.client()?.drain()
    }

    fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    fn drain_in_foreground(&self, delay: Duration) -> Result<DrainReport> {
        drain_now(Arc::clone(&self.store), &self.delivery, delay)
    }
}

/// Run one drain pass in the calling thread after `delay`.
///
/// Builds its own current-thread runtime. Called from inside another tokio
/// runtime it fails with [`Error::Daemon`] and leaves the queue untouched.
pub fn drain_now(
    store: Arc<QueueStore>,
    delivery: &DeliveryConfig,
    delay: Duration,
) -> Result<DrainReport> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::Daemon(
            "foreground drain cannot run inside an async runtime".to_string(),
        ));
    }

    let transport = ReqwestTransport::new(delivery.request_timeout())
        .map_err(courier_core::Error::from)?;
    let drainer = Drainer::new(store, transport, delivery.backoff_policy())
        .batch_size(delivery.batch_size);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(async {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        drainer.drain().await
    })
    .map_err(Error::from)
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
