// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use courier_core::Method;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse::<Method>().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "courier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Durable offline queue for outbound HTTP requests")]
#[command(
    long_about = "Durable offline queue for outbound HTTP requests.\n\n\
    Requests are written to a local queue first and delivered when the network allows, \
    with exponential backoff between failed attempts."
)]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Queue a request for delivery
    #[command(after_help = "\
Examples:
  courier enqueue https://api.example.com/ping
  courier enqueue -X POST -H 'Content-Type: application/json' -d '{\"x\":1}' https://api.example.com/echo")]
    Enqueue {
        /// Absolute http or https URL
        url: String,

        /// HTTP method
        #[arg(short = 'X', long = "method", default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// Header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header", value_name = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short = 'd', long = "data", value_name = "body")]
        body: Option<String>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued requests, oldest first
    List {
        /// Maximum number of requests to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queue depth and delivery path
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Run one delivery pass now
    Drain {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Remove every queued request without delivering it
    Clear,

    /// Manage the delivery daemon
    #[command(subcommand)]
    Daemon(DaemonCommand),
}

/// Daemon management commands.
#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Show daemon status
    Status,
    /// Stop the daemon
    Stop,
    /// Start the daemon
    Start,
    /// View daemon logs
    Logs {
        /// Follow log output (tail -f)
        #[arg(long, short = 'f')]
        follow: bool,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
