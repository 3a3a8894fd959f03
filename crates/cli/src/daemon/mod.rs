// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Worker daemon: lifecycle management and the courierd main loop.
//!
//! The CLI communicates with the courierd daemon via a Unix socket to hand
//! off deliveries that should outlive the CLI process.

mod client;
mod lifecycle;
mod runner;

pub use client::DaemonClient;
pub use lifecycle::{
    detect_daemon, get_daemon_status, get_log_path, get_socket_path, handshake_daemon,
    spawn_daemon, stop_daemon_forcefully, DaemonInfo, HandshakeResult, CLI_VERSION,
};
pub use runner::run_daemon;
