// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the courierrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] courier_core::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid header '{0}'\n  hint: headers are written as 'Name: value'")]
    InvalidHeader(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("daemon version mismatch: daemon is v{daemon_version}, CLI is v{cli_version}\n  hint: restart it with 'courier daemon stop'")]
    DaemonVersionMismatch {
        daemon_version: String,
        cli_version: String,
    },
}

/// A specialized Result type for courierrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
