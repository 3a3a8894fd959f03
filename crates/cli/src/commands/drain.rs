// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use courier_core::DrainReport;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::host::drain_now;

use super::Context;

/// Run one drain pass in this process and print the report.
pub fn run(output: OutputFormat) -> Result<()> {
    let ctx = Context::open()?;
    let report = drain_now(Arc::clone(&ctx.store), &ctx.config.delivery, Duration::ZERO)?;
    println!("{}", render(&report, output)?);
    Ok(())
}

pub(crate) fn render(report: &DrainReport, output: OutputFormat) -> Result<String> {
    if let OutputFormat::Json = output {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    if report.is_empty() {
        return Ok("Nothing to deliver.".to_string());
    }

    let mut lines = vec![format!(
        "Delivered: {}, retrying: {}, abandoned: {}, skipped: {}",
        report.delivered.len(),
        report.retried.len(),
        report.abandoned.len(),
        report.skipped.len()
    )];
    for retry in &report.retried {
        let when = retry
            .next_retry_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "now".to_string());
        lines.push(format!(
            "  retry {} (attempt {}, next at {}): {}",
            retry.id, retry.attempts, when, retry.reason
        ));
    }
    for abandoned in &report.abandoned {
        lines.push(format!(
            "  abandoned {} {} {} after {} attempts: {}",
            abandoned.id, abandoned.method, abandoned.url, abandoned.attempts, abandoned.reason
        ));
    }
    for error in &report.errors {
        lines.push(format!("  error {}: {}", error.id, error.message));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
