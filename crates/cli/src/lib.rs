// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! courierrs - durable offline queue for outbound HTTP requests.
//!
//! This crate provides the `courier` CLI and the pieces an application embeds
//! to capture requests while offline and have them delivered later.
//!
//! # Main Components
//!
//! - [`OfflineQueue`] - enqueue API over an injected store and trigger
//! - [`HostTrigger`] - picks the delivery path once (background sync, worker, foreground)
//! - [`DaemonHost`] - production host backed by the `courierd` worker daemon
//! - [`Config`] - TOML configuration for delivery, trigger and worker settings
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_core::{Method, NewRequest, QueueStore};
//! use courierrs::{config, Config, DaemonHost, HostTrigger, OfflineQueue, ProbeConnectivity};
//!
//! let state_dir = config::state_dir();
//! let config = Config::load(&state_dir)?;
//! let store = Arc::new(QueueStore::open(&config::queue_path(&state_dir))?);
//! let connectivity = ProbeConnectivity::new(None, config.trigger.probe_timeout());
//! let host = DaemonHost::new(state_dir, Arc::clone(&store), config.delivery.clone(), Box::new(connectivity));
//! let trigger = HostTrigger::detect(host, config.trigger.sync_tag.clone(), config.trigger.foreground_delay());
//!
//! let queue = OfflineQueue::new(store, trigger);
//! let id = queue.enqueue(NewRequest::new("https://api.example.com/echo").method(Method::Post))?;
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod connectivity;
pub mod daemon;
pub mod error;
pub mod host;
pub mod queue;
pub mod trigger;

pub use cli::{Cli, Command, DaemonCommand, OutputFormat};
pub use config::Config;
pub use connectivity::{Connectivity, ProbeConnectivity, StaticConnectivity};
pub use error::{Error, Result};
pub use host::{drain_now, DaemonHost};
pub use queue::{Enqueued, OfflineQueue};
pub use trigger::{Capability, DeliveryTrigger, Host, HostTrigger, TriggerOutcome};

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber when `COURIER_LOG` is set.
///
/// The CLI is silent by default; `COURIER_LOG=debug courier enqueue ...`
/// shows the queue and trigger decisions.
pub fn init_logging() {
    let Some(filter) = env::log_filter() else {
        return;
    };
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Enqueue {
            url,
            method,
            headers,
            body,
            output,
        } => commands::enqueue::run(url, method, headers, body, output),
        Command::List { limit, output } => commands::list::run(limit, output),
        Command::Status { output } => commands::status::run(output),
        Command::Drain { output } => commands::drain::run(output),
        Command::Clear => commands::clear::run(),
        Command::Daemon(cmd) => match cmd {
            DaemonCommand::Status => commands::daemon::status(),
            DaemonCommand::Stop => commands::daemon::stop(),
            DaemonCommand::Start => commands::daemon::start(),
            DaemonCommand::Logs { follow } => commands::daemon::logs(follow),
        },
    }
}
