/*!
HTTP health probe.

`check_http` issues exactly one GET against a health endpoint and folds the
result into a [`ProbeResult`]. Transport failures (reset, refused, timeout,
DNS, TLS) never escape as errors: they are classified and rendered into
`ProbeResult::error` as `"<Label>: <message>"`.

## Timeout

The timeout is enforced twice: once by the HTTP client itself and once by an
outer `tokio::time::timeout` with a small grace period, so a client that never
returns still produces a `TimeoutError` result.

## Status policy

By default any HTTP response counts as reachable. `StatusPolicy::RequireSuccess`
additionally rejects non-2xx responses as `HTTPError`.
*/

use crate::core::doctor::client::{HttpProbeClient, IsahcProbeClient};
use crate::core::doctor::debug_logger::get_debug_logger;
use crate::core::doctor::types::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT_MS: u32 = 5000;
pub const MAX_TIMEOUT_MS: u32 = 30_000;
/// Extra time granted to the client before the outer guard fires
pub const TIMEOUT_GRACE_MS: u64 = 250;

/// Whether a received HTTP status counts as a healthy probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Any response, whatever its status, means the endpoint is reachable
    #[default]
    AnyResponse,
    /// Only 2xx responses count as ok
    RequireSuccess,
}

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Request timeout in milliseconds, clamped to 1..=MAX_TIMEOUT_MS
    pub timeout_ms: u32,
    pub status_policy: StatusPolicy,
    pub follow_redirects: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            status_policy: StatusPolicy::AnyResponse,
            follow_redirects: true,
        }
    }
}

impl ProbeOptions {
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn effective_timeout_ms(&self) -> u32 {
        self.timeout_ms.clamp(1, MAX_TIMEOUT_MS)
    }
}

/// Probe `url` with default options and the production client
pub async fn check_http(url: &str) -> ProbeResult {
    check_http_opts(url, &ProbeOptions::default()).await
}

/// Probe `url` with the production client
///
/// Client construction failures are reported as a `TransportError` result.
pub async fn check_http_opts(url: &str, options: &ProbeOptions) -> ProbeResult {
    match IsahcProbeClient::new() {
        Ok(client) => check_http_with(url, options, &client).await,
        Err(e) => ProbeResult::from_outcome(
            url,
            ProbeOutcome::failed(FailureKind::Transport, e.to_string()),
            None,
            0,
            get_local_timestamp(),
        ),
    }
}

/// Probe `url` through an injected client
pub async fn check_http_with(
    url: &str,
    options: &ProbeOptions,
    client: &dyn HttpProbeClient,
) -> ProbeResult {
    let debug_logger = get_debug_logger();
    let timeout_ms = options.effective_timeout_ms();
    let probe_id = format!("probe_{}", uuid::Uuid::new_v4());
    let start = Instant::now();

    debug_logger.probe_start(url, timeout_ms as u64, probe_id.clone());

    let guard = Duration::from_millis(timeout_ms as u64 + TIMEOUT_GRACE_MS);
    let response = tokio::time::timeout(
        guard,
        client.get(url.to_string(), timeout_ms, options.follow_redirects),
    )
    .await;

    let (outcome, status_code) = match response {
        Ok(Ok(resp)) => (
            apply_status_policy(resp.status_code, options.status_policy),
            Some(resp.status_code),
        ),
        Ok(Err(err)) => (ProbeOutcome::failed(err.kind, err.message), None),
        Err(_elapsed) => (
            ProbeOutcome::failed(
                FailureKind::Timeout,
                format!("request did not complete within {}ms", timeout_ms),
            ),
            None,
        ),
    };

    let latency_ms = start.elapsed().as_millis() as u64;
    let result = ProbeResult::from_outcome(url, outcome, status_code, latency_ms, get_local_timestamp());

    debug_logger.probe_end(
        url,
        result.ok,
        result.status_code,
        latency_ms,
        result.error.as_deref(),
        probe_id,
    );

    result
}

/// Synchronous probe for callers without an async runtime
///
/// Drives the probe on a private current-thread runtime; must not be called
/// from inside another tokio runtime.
pub fn check_http_blocking(url: &str, options: &ProbeOptions) -> ProbeResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build();

    match runtime {
        Ok(rt) => rt.block_on(check_http_opts(url, options)),
        Err(e) => ProbeResult::from_outcome(
            url,
            ProbeOutcome::failed(
                FailureKind::Transport,
                format!("Failed to start probe runtime: {}", e),
            ),
            None,
            0,
            get_local_timestamp(),
        ),
    }
}

/// Apply the status policy to a received response
pub fn apply_status_policy(status_code: u16, policy: StatusPolicy) -> ProbeOutcome {
    match policy {
        StatusPolicy::AnyResponse => ProbeOutcome::Reachable { status_code },
        StatusPolicy::RequireSuccess if (200..300).contains(&status_code) => {
            ProbeOutcome::Reachable { status_code }
        }
        StatusPolicy::RequireSuccess => {
            ProbeOutcome::failed(FailureKind::HttpStatus, describe_status(status_code))
        }
    }
}

/// "HTTP 503 Service Unavailable"
fn describe_status(status_code: u16) -> String {
    let reason = isahc::http::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason());
    match reason {
        Some(reason) => format!("HTTP {} {}", status_code, reason),
        None => format!("HTTP {}", status_code),
    }
}
