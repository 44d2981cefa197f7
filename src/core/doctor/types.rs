// Core types for HTTP health probing

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable classification of a failed probe
///
/// Every variant maps to a fixed label (see [`FailureKind::label`]) that is
/// embedded verbatim in `ProbeResult::error`, so aggregators and tests can
/// match on substrings such as `"ConnectionResetError"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Peer reset the connection mid-request
    ConnectionReset,
    /// Nothing listening on the target port
    ConnectionRefused,
    /// Connection torn down locally before completion
    ConnectionAborted,
    /// Peer closed the connection without sending any response
    RemoteDisconnected,
    /// Request did not complete within the timeout bound
    Timeout,
    /// Host name could not be resolved
    NameResolution,
    /// TLS handshake or certificate verification failed
    Tls,
    /// URL could not be turned into a request
    InvalidUrl,
    /// Server spoke something other than valid HTTP
    Protocol,
    /// Response received but rejected by `StatusPolicy::RequireSuccess`
    HttpStatus,
    /// Any other transport failure
    Transport,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::ConnectionReset => "ConnectionResetError",
            FailureKind::ConnectionRefused => "ConnectionRefusedError",
            FailureKind::ConnectionAborted => "ConnectionAbortedError",
            FailureKind::RemoteDisconnected => "RemoteDisconnectedError",
            FailureKind::Timeout => "TimeoutError",
            FailureKind::NameResolution => "NameResolutionError",
            FailureKind::Tls => "TLSError",
            FailureKind::InvalidUrl => "InvalidURLError",
            FailureKind::Protocol => "ProtocolError",
            FailureKind::HttpStatus => "HTTPError",
            FailureKind::Transport => "TransportError",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Request completed and the status policy accepted the response
    Reachable { status_code: u16 },
    /// Transport failure, or a response rejected by the status policy
    Failed { kind: FailureKind, message: String },
}

impl ProbeOutcome {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        ProbeOutcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }

    /// Render the failure as `"<Label>: <message>"`
    pub fn error_string(&self) -> Option<String> {
        match self {
            ProbeOutcome::Reachable { .. } => None,
            ProbeOutcome::Failed { kind, message } => Some(format!("{}: {}", kind.label(), message)),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ProbeOutcome::Reachable { .. } => None,
            ProbeOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Exception-free result record returned by `check_http`
///
/// `ok` and `error` are derived from the underlying [`ProbeOutcome`]:
/// `error` is `Some` iff `ok` is false.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub ok: bool,
    pub error: Option<String>,
    /// HTTP status when a response was received (also set for `HTTPError` failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub latency_ms: u64,
    /// Local timezone RFC 3339 timestamp
    pub checked_at: String,
    #[serde(skip)]
    outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn from_outcome(
        url: impl Into<String>,
        outcome: ProbeOutcome,
        status_code: Option<u16>,
        latency_ms: u64,
        checked_at: String,
    ) -> Self {
        let status_code = match &outcome {
            ProbeOutcome::Reachable { status_code } => Some(*status_code),
            ProbeOutcome::Failed { .. } => status_code,
        };
        Self {
            url: url.into(),
            ok: outcome.is_ok(),
            error: outcome.error_string(),
            status_code,
            latency_ms,
            checked_at,
            outcome,
        }
    }

    pub fn outcome(&self) -> &ProbeOutcome {
        &self.outcome
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.outcome.failure_kind()
    }
}

/// A named HTTP check consumed by the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCheck {
    pub name: String,
    pub url: String,
}

impl HttpCheck {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub name: String,
    #[serde(flatten)]
    pub result: ProbeResult,
}

/// Aggregated result of a doctor run
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    /// True iff every check passed (vacuously true for no checks)
    pub ok: bool,
    pub checked_at: String,
    pub checks: Vec<CheckReport>,
}

impl DoctorReport {
    pub fn failed(&self) -> impl Iterator<Item = &CheckReport> {
        self.checks.iter().filter(|c| !c.result.ok)
    }
}

/// Crate-level errors for config, CLI and client setup
///
/// Probe failures are never reported through this type; they are data
/// carried by [`ProbeOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("Config read error ({path}): {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("Config already exists: {0}")]
    ConfigExists(PathBuf),
    #[error("Invalid check '{name}': {reason}")]
    InvalidCheck { name: String, reason: String },
    #[error("Invalid URL for check '{name}': {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: crate::core::doctor::url::UrlError,
    },
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Local timezone timestamp in RFC 3339 format
pub fn get_local_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}
