// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use courier_core::QueuedRequest;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

use super::Context;

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson<'a> {
    requests: &'a [QueuedRequest],
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

pub fn run(limit: Option<usize>, output: OutputFormat) -> Result<()> {
    let ctx = Context::open()?;
    let queue = ctx.queue();
    let shown = queue.pending(limit)?;
    let total = queue.stats()?.total;
    let rendered = render(&shown, total, limit, ctx.store.now(), output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

/// One line per request: id, method, url, attempts and retry state.
pub(crate) fn format_request_line(request: &QueuedRequest, now: DateTime<Utc>) -> String {
    let state = match request.next_retry_at {
        Some(at) if at > now => format!("retry at {}", at.format("%Y-%m-%d %H:%M:%S")),
        _ => "ready".to_string(),
    };
    format!(
        "{} {} {} (attempts: {}, {})",
        request.id, request.method, request.url, request.attempts, state
    )
}

pub(crate) fn render(
    shown: &[QueuedRequest],
    total: usize,
    limit: Option<usize>,
    now: DateTime<Utc>,
    output: OutputFormat,
) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let mut lines: Vec<String> = shown
                .iter()
                .map(|r| format_request_line(r, now))
                .collect();
            if shown.len() < total {
                lines.push(format!("... {} more", total - shown.len()));
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ListOutputJson {
            requests: shown,
            total,
            limit,
        })?),
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
