//! Command Transport
//!
//! One outbound GET per command, bounded by connect/read/total timeouts.
//! Never retries: every attempt is fire-once.

use super::types::CommandResult;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Default connect, read and total-call timeout (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5;

/// Executes a single command request
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Perform one GET against `url`; failures are folded into the result
    async fn send(&self, url: &Url) -> CommandResult;
}

/// reqwest-backed transport
pub struct HttpCommandTransport {
    client: Client,
}

impl HttpCommandTransport {
    /// Create transport with the default 5 second bounds
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS))
    }

    /// Create transport using `timeout` for connect, read and the whole call
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .timeout(timeout)
            // 3xx is reported as-is, not followed
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CommandTransport for HttpCommandTransport {
    async fn send(&self, url: &Url) -> CommandResult {
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(url = %url, status = %status, "Camera command response");
                status_to_result(status)
            }
            Err(e) => {
                let message = describe_error(&e);
                tracing::warn!(url = %url, error = %e, "Camera command request failed");
                CommandResult::failure(message)
            }
        }
    }
}

/// Any received response is a completed attempt; only 2xx/3xx count as success
fn status_to_result(status: StatusCode) -> CommandResult {
    if status.is_success() || status.is_redirection() {
        CommandResult::success()
    } else {
        CommandResult::failure(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        ))
    }
}

/// Short diagnostic for a transport failure
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "Request timed out".to_string();
    }

    // innermost cause is the most specific (DNS, refused, reset...)
    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }

    if error.is_connect() {
        format!("Connection failed: {}", source)
    } else {
        source.to_string()
    }
}
