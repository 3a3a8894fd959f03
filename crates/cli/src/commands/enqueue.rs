// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use courier_core::{Method, NewRequest};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::queue::Enqueued;
use crate::trigger::TriggerOutcome;

use super::Context;

/// JSON output of the enqueue command.
#[derive(Serialize)]
struct EnqueueJson<'a> {
    id: i64,
    method: Method,
    url: &'a str,
    delivery: &'static str,
    message: String,
}

pub fn run(
    url: String,
    method: Method,
    headers: Vec<String>,
    body: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let request = build_request(url, method, &headers, body)?;
    let ctx = Context::open()?;
    let enqueued = ctx.queue().enqueue_with_outcome(request)?;
    println!("{}", render(&enqueued, output)?);
    Ok(())
}

/// Split a `Name: value` header argument.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(Error::InvalidHeader(raw.to_string()));
    };
    let name = name.trim();
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub(crate) fn build_request(
    url: String,
    method: Method,
    headers: &[String],
    body: Option<String>,
) -> Result<NewRequest> {
    let mut request = NewRequest::new(url).method(method);
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        request = request.header(name, value);
    }
    if let Some(body) = body {
        request = request.body(body);
    }
    Ok(request)
}

fn delivery_kind(outcome: &TriggerOutcome) -> &'static str {
    match outcome {
        TriggerOutcome::Registered { .. } => "registered",
        TriggerOutcome::Posted => "posted",
        TriggerOutcome::DrainedInForeground(_) => "drained",
        TriggerOutcome::Deferred => "deferred",
    }
}

pub(crate) fn render(enqueued: &Enqueued, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => Ok(format!(
            "Queued {} {} {}\n{}",
            enqueued.request.id, enqueued.request.method, enqueued.request.url, enqueued.outcome
        )),
        OutputFormat::Json => {
            let json = EnqueueJson {
                id: enqueued.request.id.0,
                method: enqueued.request.method,
                url: &enqueued.request.url,
                delivery: delivery_kind(&enqueued.outcome),
                message: enqueued.outcome.to_string(),
            };
            Ok(serde_json::to_string(&json)?)
        }
    }
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
