// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for CLI-daemon communication.
//!
//! This crate defines the message types and framing protocol used between
//! the `courier` CLI and the `courierd` delivery worker. Messages are
//! serialized as JSON with length-prefixed framing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol types
// ============================================================================

/// Request sent from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonRequest {
    /// Get daemon status.
    Status,
    /// Graceful shutdown.
    Shutdown,
    /// Ping to check if daemon is alive.
    Ping,
    /// Version handshake request.
    Hello { version: String },
    /// Ask the daemon to keep draining under `tag` until the queue is empty.
    RegisterSync { tag: String },
    /// Ask the daemon to run one drain pass now.
    Drain,
}

/// Response sent from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonResponse {
    /// Status response.
    Status(DaemonStatus),
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Pong response.
    Pong,
    /// Error response.
    Error { message: String },
    /// Version handshake response.
    Hello {
        version: String,
        /// Whether the daemon accepts background sync registrations.
        background_sync: bool,
    },
    /// Background sync registration accepted.
    Registered { tag: String },
    /// A drain pass was queued on the daemon.
    DrainScheduled,
}

/// Daemon status information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    /// Current daemon PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Whether background sync registration is enabled.
    pub background_sync: bool,
    /// Outstanding sync registrations.
    #[serde(default)]
    pub registrations: Vec<String>,
    /// Requests currently stored in the queue.
    pub queue_depth: usize,
    /// When the last drain pass finished.
    pub last_drain: Option<DateTime<Utc>>,
}

impl DaemonStatus {
    /// Create a new status with the given parameters.
    pub fn new(pid: u32, uptime_secs: u64) -> Self {
        Self {
            pid,
            uptime_secs,
            background_sync: false,
            registrations: Vec::new(),
            queue_depth: 0,
            last_drain: None,
        }
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// Maximum message size (1MB) to prevent malformed messages from causing hangs.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

fn encode<T: Serialize>(message: &T) -> std::io::Result<(u32, Vec<u8>)> {
    let json = serde_json::to_vec(message)
        .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
    let len = u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::other("message too large"));
    }
    Ok((len, json))
}

fn check_len(len_buf: [u8; 4]) -> std::io::Result<usize> {
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::other(format!(
            "message too large: {} bytes (max {})",
            len, MAX_MESSAGE_SIZE
        )));
    }
    Ok(len)
}

fn decode<T: serde::de::DeserializeOwned>(buf: &[u8]) -> std::io::Result<T> {
    serde_json::from_slice(buf)
        .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
}

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    use super::{check_len, decode, encode, DaemonRequest, DaemonResponse};

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let (len, json) = encode(message)?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = check_len(len_buf)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        decode(&buf)
    }

    pub fn write_request<W: Write>(writer: &mut W, request: &DaemonRequest) -> std::io::Result<()> {
        write_message(writer, request)
    }

    pub fn read_response<R: Read>(reader: &mut R) -> std::io::Result<DaemonResponse> {
        read_message(reader)
    }
}

/// Async counterpart of [`framing`] for the daemon's tokio listener.
pub mod framing_async {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use super::{check_len, decode, encode, DaemonRequest, DaemonResponse};

    /// Write a serializable message to the given async writer.
    pub async fn write_message<W, T>(writer: &mut W, message: &T) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
        T: Serialize,
    {
        let (len, json) = encode(message)?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a deserializable message from the given async reader.
    pub async fn read_message<R, T>(reader: &mut R) -> std::io::Result<T>
    where
        R: AsyncRead + Unpin,
        T: DeserializeOwned,
    {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = check_len(len_buf)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        decode(&buf)
    }

    pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<DaemonRequest> {
        read_message(reader).await
    }

    pub async fn write_response<W: AsyncWrite + Unpin>(
        writer: &mut W,
        response: &DaemonResponse,
    ) -> std::io::Result<()> {
        write_message(writer, response).await
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
