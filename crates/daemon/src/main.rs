// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! courierd - The courier delivery worker.
//!
//! Drains the queue at `<state_dir>/queue.db` on request and keeps retrying
//! while background sync registrations are outstanding, after the enqueuing
//! `courier` process has exited. Listens on a Unix socket for IPC.
//!
//! Usage:
//!   courierd --state-dir <path>

use std::fs;
use std::path::{Path, PathBuf};

use courierrs::daemon::{get_log_path, run_daemon};
use courierrs::Config;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let state_dir = parse_state_dir(&args);

    let _ = fs::create_dir_all(&state_dir);
    setup_logging(&get_log_path(&state_dir));

    tracing::info!("courierd starting, state_dir={}", state_dir.display());

    let config = match Config::load(&state_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load config: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_daemon(&state_dir, &config) {
        tracing::error!("daemon failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("courierd stopped");
}

fn parse_state_dir(args: &[String]) -> PathBuf {
    for i in 0..args.len() {
        if args[i] == "--state-dir" {
            if let Some(dir) = args.get(i + 1) {
                return PathBuf::from(dir);
            }
        }
    }
    courierrs::config::state_dir()
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
