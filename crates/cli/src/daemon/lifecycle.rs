// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: spawn, detect, handshake, cleanup.
//!
//! The daemon (courierd) is spawned as a background process and communicates
//! via Unix socket. PID, lock, socket and log files are stored in the state
//! directory next to the queue database.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use courier_ipc::DaemonStatus;

use crate::env;
use crate::error::{Error, Result};

use super::client::DaemonClient;

/// Socket filename within daemon directory.
const SOCKET_NAME: &str = "daemon.sock";
/// PID filename within daemon directory.
const PID_NAME: &str = "daemon.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "daemon.lock";
/// Log filename within daemon directory.
const LOG_NAME: &str = "daemon.log";
/// Daemon binary name.
const DAEMON_BINARY: &str = "courierd";

/// CLI version for handshake.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Information about a running daemon.
#[derive(Debug, Clone)]
pub struct DaemonInfo {
    /// Process ID of the daemon.
    pub pid: u32,
}

/// Result of the version handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeResult {
    /// Same version; reports whether background sync is enabled.
    Compatible { background_sync: bool },
    /// Daemon answered with a different version.
    VersionMismatch { daemon_version: String },
    /// No daemon reachable or the exchange failed.
    Failed(String),
}

/// Get the socket path for the given daemon directory.
pub fn get_socket_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(SOCKET_NAME)
}

/// Get the PID file path for the given daemon directory.
pub fn get_pid_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(PID_NAME)
}

/// Get the lock file path for the given daemon directory.
pub fn get_lock_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(LOCK_NAME)
}

/// Get the log file path for the given daemon directory.
pub fn get_log_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(LOG_NAME)
}

/// Detect if a daemon is running for the given daemon directory.
///
/// Returns Some(DaemonInfo) if a daemon is running and responding,
/// None otherwise. Cleans up stale PID/socket files if found.
pub fn detect_daemon(daemon_dir: &Path) -> Result<Option<DaemonInfo>> {
    let socket_path = get_socket_path(daemon_dir);
    let pid_path = get_pid_path(daemon_dir);

    if !socket_path.exists() {
        // No socket, clean up stale PID file if it exists
        if pid_path.exists() {
            let _ = fs::remove_file(&pid_path);
        }
        return Ok(None);
    }

    let pinged = DaemonClient::connect_with_timeout(&socket_path, Duration::from_secs(2))
        .and_then(|client| client.ping());
    if pinged.is_err() {
        cleanup_stale_files(daemon_dir);
        return Ok(None);
    }

    match read_pid_file(&pid_path) {
        Some(pid) if pid > 0 => Ok(Some(DaemonInfo { pid })),
        // PID file missing or invalid - daemon may be starting up
        _ => Ok(None),
    }
}

/// Perform the version handshake with a running daemon.
///
/// Never spawns a daemon; an absent or dead daemon is `Failed`.
pub fn handshake_daemon(daemon_dir: &Path) -> HandshakeResult {
    let socket_path = get_socket_path(daemon_dir);
    if !socket_path.exists() {
        return HandshakeResult::Failed("daemon is not running".to_string());
    }

    let hello = DaemonClient::connect_with_timeout(&socket_path, Duration::from_secs(2))
        .and_then(|client| client.hello(CLI_VERSION));
    match hello {
        Ok((version, background_sync)) if version == CLI_VERSION => {
            HandshakeResult::Compatible { background_sync }
        }
        Ok((daemon_version, _)) => HandshakeResult::VersionMismatch { daemon_version },
        Err(e) => HandshakeResult::Failed(e.to_string()),
    }
}

/// Get daemon status by connecting to the daemon.
pub fn get_daemon_status(daemon_dir: &Path) -> Result<Option<DaemonStatus>> {
    let socket_path = get_socket_path(daemon_dir);

    if !socket_path.exists() {
        return Ok(None);
    }

    match DaemonClient::connect(&socket_path) {
        Ok(client) => client.status().map(Some),
        Err(e) => {
            cleanup_stale_files(daemon_dir);
            Err(e)
        }
    }
}

/// Send a shutdown request to the daemon.
pub fn stop_daemon(daemon_dir: &Path) -> Result<()> {
    let socket_path = get_socket_path(daemon_dir);

    if !socket_path.exists() {
        return Err(Error::Daemon("daemon is not running".to_string()));
    }

    DaemonClient::connect_with_timeout(&socket_path, Duration::from_secs(2))?.shutdown()
}

/// Find the courierd binary.
fn find_daemon_binary() -> PathBuf {
    // 1. Check COURIER_DAEMON_BINARY env var
    if let Some(path) = env::daemon_binary() {
        return path;
    }

    // 2. Look next to the current executable
    if let Ok(exe) = std::env::current_exe() {
        let candidate = exe.with_file_name(DAEMON_BINARY);
        if candidate.exists() {
            return candidate;
        }
    }

    // 3. Fall back to PATH
    PathBuf::from(DAEMON_BINARY)
}

/// Spawn a new daemon process for the given daemon directory.
///
/// Returns the DaemonInfo for the spawned daemon.
/// Uses flock to ensure only one daemon instance per daemon directory.
pub fn spawn_daemon(daemon_dir: &Path) -> Result<DaemonInfo> {
    if let Some(info) = detect_daemon(daemon_dir)? {
        return Ok(info);
    }

    fs::create_dir_all(daemon_dir)?;

    let daemon_path = find_daemon_binary();

    let mut child = Command::new(&daemon_path)
        .arg("--state-dir")
        .arg(daemon_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Daemon(format!(
                "failed to start {} ({}): {}",
                DAEMON_BINARY,
                daemon_path.display(),
                e
            ))
        })?;

    // Wait for daemon to signal it's ready (writes "READY" to stdout)
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    // Verify daemon is running with short polling
    for _ in 0..150 {
        if let Ok(Some(status)) = child.try_wait() {
            let stderr_output = if let Some(mut stderr) = child.stderr.take() {
                use std::io::Read;
                let mut output = String::new();
                let _ = stderr.read_to_string(&mut output);
                output
            } else {
                String::new()
            };
            return Err(Error::Daemon(format!(
                "daemon process exited with status: {}\n{}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(info) = detect_daemon(daemon_dir)? {
            return Ok(info);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Daemon(
        "daemon failed to start: could not connect after multiple attempts".to_string(),
    ))
}

/// Clean up stale socket and PID files.
fn cleanup_stale_files(daemon_dir: &Path) {
    let _ = fs::remove_file(get_socket_path(daemon_dir));
    let _ = fs::remove_file(get_pid_path(daemon_dir));
}

/// Read PID from the PID file.
fn read_pid_file(pid_path: &Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Stop the daemon forcefully if graceful shutdown fails.
///
/// Tries graceful shutdown first, then sends SIGKILL if needed.
pub fn stop_daemon_forcefully(daemon_dir: &Path) -> Result<()> {
    let pid = read_pid_file(&get_pid_path(daemon_dir));

    if stop_daemon(daemon_dir).is_ok() {
        if let Some(pid) = pid {
            wait_for_process_exit(pid, Duration::from_secs(1));
        }
        cleanup_stale_files(daemon_dir);
        return Ok(());
    }

    if let Some(pid) = pid {
        let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
        std::thread::sleep(Duration::from_millis(100));
    }

    cleanup_stale_files(daemon_dir);
    Ok(())
}

/// Wait for a process to exit, with timeout.
fn wait_for_process_exit(pid: u32, timeout: Duration) {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        let result = Command::new("kill").arg("-0").arg(pid.to_string()).output();

        match result {
            Ok(output) if !output.status.success() => return,
            Err(_) => return,
            _ => {}
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
