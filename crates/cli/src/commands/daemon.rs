// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands.
//!
//! Commands for controlling the courierd worker that drains the queue in the
//! background.

use crate::config::state_dir;
use crate::daemon;
use crate::error::{Error, Result};

/// Show daemon status.
pub fn status() -> Result<()> {
    let daemon_dir = state_dir();

    match daemon::get_daemon_status(&daemon_dir) {
        Ok(Some(status)) => {
            println!("Status: running");
            println!("PID: {}", status.pid);
            println!("Uptime: {}s", status.uptime_secs);
            println!(
                "Background sync: {}",
                if status.background_sync { "enabled" } else { "disabled" }
            );
            println!("Queue depth: {}", status.queue_depth);
            if let Some(last) = status.last_drain {
                println!("Last drain: {}", last.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        Ok(None) => {
            println!("Status: not running");
        }
        Err(e) => {
            println!("Status: error ({})", e);
        }
    }

    Ok(())
}

/// Stop the daemon.
pub fn stop() -> Result<()> {
    let daemon_dir = state_dir();

    if daemon::detect_daemon(&daemon_dir)?.is_none() {
        println!("Daemon is not running.");
        return Ok(());
    }

    match daemon::stop_daemon_forcefully(&daemon_dir) {
        Ok(()) => {
            println!("Daemon stopped.");
        }
        Err(e) => {
            println!("Failed to stop daemon: {}", e);
        }
    }

    Ok(())
}

/// Start the daemon.
pub fn start() -> Result<()> {
    let daemon_dir = state_dir();

    match daemon::detect_daemon(&daemon_dir)? {
        Some(info) => {
            println!("Daemon is already running (PID: {})", info.pid);
        }
        None => match daemon::spawn_daemon(&daemon_dir) {
            Ok(info) => {
                println!("Daemon started (PID: {})", info.pid);
            }
            Err(e) => {
                return Err(Error::Daemon(format!("failed to start daemon: {}", e)));
            }
        },
    }

    Ok(())
}

/// View daemon logs.
pub fn logs(follow: bool) -> Result<()> {
    let log_path = daemon::get_log_path(&state_dir());

    if !log_path.exists() {
        println!("No daemon logs found at {}", log_path.display());
        return Ok(());
    }

    if follow {
        let status = std::process::Command::new("tail")
            .arg("-f")
            .arg(&log_path)
            .status()?;

        if !status.success() {
            return Err(Error::Io(std::io::Error::other("tail command failed")));
        }
    } else {
        let content = std::fs::read_to_string(&log_path)?;
        print!("{}", content);
    }

    Ok(())
}
