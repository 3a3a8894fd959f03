// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for outbound HTTP.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP delivery via reqwest for production
//! - Mock transports for unit testing
//!
//! The request goes out exactly as it was captured: same method, URL,
//! headers and body.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::request::QueuedRequest;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built from the stored fields.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection or protocol failure.
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// The part of an HTTP response the drainer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for issuing a queued request.
///
/// This trait abstracts over the actual HTTP client, allowing
/// for easy testing with mock implementations.
pub trait HttpTransport: Send + Sync {
    /// Send the request and report the response status.
    fn send<'a>(
        &'a self,
        request: &'a QueuedRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + 'a>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn send<'a>(
        &'a self,
        request: &'a QueuedRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + 'a>> {
        (**self).send(request)
    }
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(ReqwestTransport { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a QueuedRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + 'a>> {
        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else if e.is_builder() {
                    TransportError::InvalidRequest(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

            Ok(HttpResponse {
                status: response.status().as_u16(),
            })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
