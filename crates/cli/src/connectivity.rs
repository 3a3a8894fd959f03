// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline signal for the delivery trigger.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Reports whether the host currently has network connectivity.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Fixed answer, used for tests and the `COURIER_OFFLINE=1` override.
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.0
    }
}

/// Probes a `host:port` with a TCP connect.
///
/// Without a probe address the host is assumed online.
#[derive(Debug, Clone)]
pub struct ProbeConnectivity {
    target: Option<String>,
    timeout: Duration,
}

impl ProbeConnectivity {
    pub fn new(target: Option<String>, timeout: Duration) -> Self {
        ProbeConnectivity { target, timeout }
    }
}

impl Connectivity for ProbeConnectivity {
    fn is_online(&self) -> bool {
        let Some(target) = &self.target else {
            return true;
        };

        let addrs = match target.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!(target = %target, error = %e, "probe address did not resolve");
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        tracing::debug!(target = %target, "connectivity probe failed");
        false
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
