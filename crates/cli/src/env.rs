// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI and the daemon are
//! defined here with typed accessor functions. The variable name constants
//! are generated by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `COURIER_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(vars::COURIER_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(vars::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Returns the value of `COURIER_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(vars::COURIER_CONFIG).ok().map(PathBuf::from)
}

/// Returns `true` if `COURIER_OFFLINE=1`.
pub fn force_offline() -> bool {
    std::env::var(vars::COURIER_OFFLINE).is_ok_and(|v| v == "1")
}

/// Returns the value of `COURIER_DAEMON_BINARY` if set.
pub fn daemon_binary() -> Option<PathBuf> {
    std::env::var(vars::COURIER_DAEMON_BINARY)
        .ok()
        .map(PathBuf::from)
}

/// Returns the CLI log filter from `COURIER_LOG`, if set.
pub fn log_filter() -> Option<String> {
    std::env::var(vars::COURIER_LOG).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
