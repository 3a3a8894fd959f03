// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use courier_core::QueueStats;
use courier_ipc::DaemonStatus;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::daemon;
use crate::error::Result;
use crate::trigger::Capability;

use super::Context;

/// JSON output of the status command.
#[derive(Serialize)]
struct StatusJson<'a> {
    queue: &'a QueueStats,
    delivery_path: String,
    daemon: Option<&'a DaemonStatus>,
}

pub fn run(output: OutputFormat) -> Result<()> {
    let ctx = Context::open()?;
    let queue = ctx.queue();
    let stats = queue.stats()?;
    let capability = queue.trigger().capability();
    let daemon_status = match daemon::get_daemon_status(&ctx.state_dir) {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!(error = %e, "daemon status unavailable");
            None
        }
    };
    println!(
        "{}",
        render(&stats, capability, daemon_status.as_ref(), output)?
    );
    Ok(())
}

pub(crate) fn render(
    stats: &QueueStats,
    capability: Capability,
    daemon_status: Option<&DaemonStatus>,
    output: OutputFormat,
) -> Result<String> {
    if let OutputFormat::Json = output {
        return Ok(serde_json::to_string_pretty(&StatusJson {
            queue: stats,
            delivery_path: capability.to_string(),
            daemon: daemon_status,
        })?);
    }

    let mut lines = vec![format!(
        "Queued: {} ({} ready, {} waiting)",
        stats.total, stats.eligible, stats.waiting
    )];
    if let Some(oldest) = stats.oldest_enqueued_at {
        lines.push(format!("Oldest: {}", oldest.format("%Y-%m-%d %H:%M:%S")));
    }
    lines.push(format!("Delivery path: {}", capability));
    match daemon_status {
        Some(status) => {
            lines.push(format!(
                "Daemon: running (PID: {}, uptime: {}s)",
                status.pid, status.uptime_secs
            ));
            if !status.registrations.is_empty() {
                lines.push(format!(
                    "Pending sync: {}",
                    status.registrations.join(", ")
                ));
            }
        }
        None => lines.push("Daemon: not running".to_string()),
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
