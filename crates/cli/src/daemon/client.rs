// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client for communicating with the courierd daemon.
//!
//! Provides a connection to the daemon and methods for sending requests.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use courier_ipc::{framing, DaemonRequest, DaemonResponse, DaemonStatus};

use crate::error::{Error, Result};

/// Connection timeout for daemon communication.
const TIMEOUT_SECS: u64 = 5;

/// A client connection to the daemon.
///
/// The daemon handles one request per connection, so each call consumes
/// the client.
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to the daemon at the given socket path.
    pub fn connect(socket_path: &Path) -> Result<Self> {
        Self::connect_with_timeout(socket_path, Duration::from_secs(TIMEOUT_SECS))
    }

    /// Connect with a custom read/write timeout.
    pub fn connect_with_timeout(socket_path: &Path, timeout: Duration) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .map_err(|e| Error::Daemon(format!("failed to connect to daemon: {}", e)))?;

        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| Error::Daemon(format!("failed to set read timeout: {}", e)))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| Error::Daemon(format!("failed to set write timeout: {}", e)))?;

        Ok(DaemonClient { stream })
    }

    /// Send a request and receive a response.
    fn request(mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        framing::write_request(&mut self.stream, &request)?;
        match framing::read_response(&mut self.stream)? {
            DaemonResponse::Error { message } => Err(Error::Daemon(message)),
            response => Ok(response),
        }
    }

    pub fn ping(self) -> Result<()> {
        match self.request(DaemonRequest::Ping)? {
            DaemonResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Version handshake. Returns the daemon version and whether it accepts
    /// background sync registrations.
    pub fn hello(self, version: &str) -> Result<(String, bool)> {
        let request = DaemonRequest::Hello {
            version: version.to_string(),
        };
        match self.request(request)? {
            DaemonResponse::Hello {
                version,
                background_sync,
            } => Ok((version, background_sync)),
            other => Err(unexpected(other)),
        }
    }

    pub fn status(self) -> Result<DaemonStatus> {
        match self.request(DaemonRequest::Status)? {
            DaemonResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    pub fn register_sync(self, tag: &str) -> Result<()> {
        let request = DaemonRequest::RegisterSync {
            tag: tag.to_string(),
        };
        match self.request(request)? {
            DaemonResponse::Registered { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn drain(self) -> Result<()> {
        match self.request(DaemonRequest::Drain)? {
            DaemonResponse::DrainScheduled => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn shutdown(self) -> Result<()> {
        match self.request(DaemonRequest::Shutdown)? {
            DaemonResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: DaemonResponse) -> Error {
    Error::Daemon(format!("unexpected response: {:?}", response))
}
