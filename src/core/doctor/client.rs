//! HTTP Probe Client Implementations
//!
//! Provides the HTTP client abstraction used by the health probe: a single
//! GET with a per-request timeout and redirect control, reporting failures
//! as classified [`TransportError`]s instead of opaque strings.

use crate::core::doctor::classify::{
    classify_error_chain, classify_io_kind, classify_isahc_error, classify_message,
    describe_error_chain,
};
use crate::core::doctor::types::{DoctorError, FailureKind};
use std::time::{Duration, Instant};

use isahc::config::{Configurable, RedirectPolicy};
use isahc::{AsyncReadResponseExt, HttpClient, Request};

/// Maximum redirects followed when `follow_redirects` is enabled
pub const MAX_REDIRECTS: u32 = 5;

const USER_AGENT: &str = concat!("jarvis-doctor/", env!("CARGO_PKG_VERSION"));

/// Summary of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Time until the response body was fully read
    pub duration: Duration,
    /// Response body size in bytes
    pub body_len: usize,
}

/// Classified transport failure reported by a [`HttpProbeClient`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build from free-form text, classifying by its content
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify_message(&message).unwrap_or(FailureKind::Transport);
        Self { kind, message }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        // Body reads surface isahc errors wrapped in io::Error
        if let Some(inner) = error.get_ref().and_then(|e| e.downcast_ref::<isahc::Error>()) {
            return Self {
                kind: classify_isahc_error(inner),
                message: describe_error_chain(inner),
            };
        }

        let kind = classify_io_kind(error.kind())
            .or_else(|| classify_error_chain(&error))
            .unwrap_or(FailureKind::Transport);
        Self {
            kind,
            message: describe_error_chain(&error),
        }
    }
}

impl From<isahc::Error> for TransportError {
    fn from(error: isahc::Error) -> Self {
        Self {
            kind: classify_isahc_error(&error),
            message: describe_error_chain(&error),
        }
    }
}

/// HTTP client used by the health probe
///
/// Implementations perform exactly one GET and must not retry.
#[async_trait::async_trait]
pub trait HttpProbeClient: Send + Sync {
    /// Execute GET request to a health endpoint
    ///
    /// # Arguments
    /// * `url` - Complete health check URL (e.g., "http://host/v1/health")
    /// * `timeout_ms` - Request timeout in milliseconds
    /// * `follow_redirects` - Follow up to [`MAX_REDIRECTS`] redirects
    ///
    /// # Returns
    /// * `Ok(ProbeResponse)` - Any HTTP response was received
    /// * `Err(TransportError)` - Request never produced a response
    async fn get(
        &self,
        url: String,
        timeout_ms: u32,
        follow_redirects: bool,
    ) -> Result<ProbeResponse, TransportError>;
}

/// Production probe client implementation using isahc
pub struct IsahcProbeClient {
    client: HttpClient,
}

#[async_trait::async_trait]
impl HttpProbeClient for IsahcProbeClient {
    async fn get(
        &self,
        url: String,
        timeout_ms: u32,
        follow_redirects: bool,
    ) -> Result<ProbeResponse, TransportError> {
        let start = Instant::now();

        let redirect_policy = if follow_redirects {
            RedirectPolicy::Limit(MAX_REDIRECTS)
        } else {
            RedirectPolicy::None
        };

        let request = Request::get(&url)
            .timeout(Duration::from_millis(timeout_ms as u64))
            .redirect_policy(redirect_policy)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json, */*")
            .body(())
            .map_err(|e| TransportError::new(FailureKind::InvalidUrl, e.to_string()))?;

        let mut response = self.client.send_async(request).await?;
        let status_code = response.status().as_u16();

        // Drain the body so a reset mid-response still counts as a failure
        let body = response.bytes().await?;

        Ok(ProbeResponse {
            status_code,
            duration: start.elapsed(),
            body_len: body.len(),
        })
    }
}

impl IsahcProbeClient {
    pub fn new() -> Result<Self, DoctorError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::None)
            .build()
            .map_err(|e| DoctorError::HttpClient(format!("Failed to create probe client: {}", e)))?;
        Ok(Self { client })
    }
}
