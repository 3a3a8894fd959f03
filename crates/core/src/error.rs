// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for courier-core operations.

use thiserror::Error;

use crate::request::RequestId;
use crate::transport::TransportError;

/// All possible errors that can occur in courier-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("queue store unavailable: {0}\n  hint: the request was not queued; check that the state directory is writable")]
    StoreUnavailable(String),

    #[error("attempts for request {id} cannot decrease from {from} to {to}")]
    AttemptsDecreased { id: RequestId, from: u32, to: u32 },

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS")]
    InvalidMethod(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// A specialized Result type for courier-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
