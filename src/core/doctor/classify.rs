//! Transport failure classification
//!
//! Maps whatever the underlying HTTP client reports into a [`FailureKind`].
//! Order of precedence:
//! 1. structured causes in the `source()` chain: a `curl::Error` code or a
//!    `std::io::Error` kind
//! 2. the isahc error kind (when it is specific enough)
//! 3. curl/OS diagnostic text
//! 4. `FailureKind::Transport`

use crate::core::doctor::types::FailureKind;
use std::error::Error as StdError;
use std::io;

/// Map an io error kind to a failure kind, if it names one
pub fn classify_io_kind(kind: io::ErrorKind) -> Option<FailureKind> {
    match kind {
        io::ErrorKind::ConnectionReset => Some(FailureKind::ConnectionReset),
        io::ErrorKind::ConnectionRefused => Some(FailureKind::ConnectionRefused),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe => {
            Some(FailureKind::ConnectionAborted)
        }
        io::ErrorKind::TimedOut => Some(FailureKind::Timeout),
        io::ErrorKind::InvalidInput => Some(FailureKind::InvalidUrl),
        _ => None,
    }
}

/// Map a libcurl result code to a failure kind
///
/// curl's optional extra description (e.g. "Connection refused") wins over
/// the bare code when it names a category.
pub fn classify_curl_error(err: &curl::Error) -> Option<FailureKind> {
    if let Some(kind) = err.extra_description().and_then(classify_message) {
        return Some(kind);
    }

    if err.is_recv_error() || err.is_send_error() {
        // 56/55: the peer tore the connection down mid-exchange
        Some(FailureKind::ConnectionReset)
    } else if err.is_got_nothing() {
        Some(FailureKind::RemoteDisconnected)
    } else if err.is_couldnt_connect() {
        // 7: connect() itself was rejected
        Some(FailureKind::ConnectionRefused)
    } else if err.is_couldnt_resolve_host() || err.is_couldnt_resolve_proxy() {
        Some(FailureKind::NameResolution)
    } else if err.is_operation_timedout() {
        Some(FailureKind::Timeout)
    } else if err.is_ssl_connect_error()
        || err.is_peer_failed_verification()
        || err.is_ssl_certproblem()
    {
        Some(FailureKind::Tls)
    } else if err.is_url_malformed() {
        Some(FailureKind::InvalidUrl)
    } else if err.is_too_many_redirects() || err.is_http2_error() {
        Some(FailureKind::Protocol)
    } else {
        None
    }
}

/// Match diagnostic text produced by curl or the OS
pub fn classify_message(message: &str) -> Option<FailureKind> {
    let lower = message.to_lowercase();

    // Most specific first: "connection reset" must win over a generic "connect" hit.
    if lower.contains("connection reset")
        || lower.contains("reset by peer")
        || lower.contains("failure when receiving data from the peer")
        || lower.contains("failure when sending data to the peer")
    {
        Some(FailureKind::ConnectionReset)
    } else if lower.contains("empty reply from server") || lower.contains("server returned nothing") {
        Some(FailureKind::RemoteDisconnected)
    } else if lower.contains("connection refused") || lower.contains("couldn't connect") {
        Some(FailureKind::ConnectionRefused)
    } else if lower.contains("connection aborted") || lower.contains("broken pipe") {
        Some(FailureKind::ConnectionAborted)
    } else if lower.contains("timed out") || lower.contains("timeout") {
        Some(FailureKind::Timeout)
    } else if lower.contains("could not resolve")
        || lower.contains("couldn't resolve")
        || lower.contains("name resolution")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
    {
        Some(FailureKind::NameResolution)
    } else if lower.contains("ssl") || lower.contains("tls") || lower.contains("certificate") {
        Some(FailureKind::Tls)
    } else {
        None
    }
}

/// Structured causes only: `curl::Error` codes and io error kinds
pub fn classify_structured_chain(err: &(dyn StdError + 'static)) -> Option<FailureKind> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(curl_err) = e.downcast_ref::<curl::Error>() {
            if let Some(kind) = classify_curl_error(curl_err) {
                return Some(kind);
            }
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if let Some(kind) = classify_io_kind(io_err.kind()) {
                return Some(kind);
            }
        }
        current = e.source();
    }
    None
}

/// Rendered text of every error in the chain
pub fn classify_message_chain(err: &(dyn StdError + 'static)) -> Option<FailureKind> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(kind) = classify_message(&e.to_string()) {
            return Some(kind);
        }
        current = e.source();
    }
    None
}

/// Walk an error's `source()` chain: structured causes first, then text
pub fn classify_error_chain(err: &(dyn StdError + 'static)) -> Option<FailureKind> {
    classify_structured_chain(err).or_else(|| classify_message_chain(err))
}

/// Classify an isahc transport error
pub fn classify_isahc_error(err: &isahc::Error) -> FailureKind {
    use isahc::error::ErrorKind;

    if let Some(kind) = classify_structured_chain(err) {
        return kind;
    }

    match err.kind() {
        ErrorKind::Timeout => FailureKind::Timeout,
        ErrorKind::NameResolution => FailureKind::NameResolution,
        ErrorKind::BadServerCertificate
        | ErrorKind::BadClientCertificate
        | ErrorKind::TlsEngine => FailureKind::Tls,
        ErrorKind::InvalidRequest => FailureKind::InvalidUrl,
        ErrorKind::ProtocolViolation | ErrorKind::TooManyRedirects => FailureKind::Protocol,
        // Refused vs unreachable is only known from the details
        _ => classify_message_chain(err).unwrap_or(FailureKind::Transport),
    }
}

// isahc renders kinds that carry no description (e.g. `Io`) this way
const UNDESCRIBED_ERROR: &str = "unknown error";

/// Top-level message plus the innermost cause, e.g.
/// "failed to connect to the server ([7] Couldn't connect to server)"
///
/// An undescribed top-level message is replaced by the cause outright.
pub fn describe_error_chain(err: &(dyn StdError + 'static)) -> String {
    let top = err.to_string();

    let mut innermost: Option<&(dyn StdError + 'static)> = None;
    let mut current = err.source();
    while let Some(e) = current {
        innermost = Some(e);
        current = e.source();
    }

    match innermost.map(|e| e.to_string()) {
        Some(detail) if !detail.is_empty() && top == UNDESCRIBED_ERROR => detail,
        Some(detail) if !detail.is_empty() && !top.contains(&detail) => {
            format!("{} ({})", top, detail)
        }
        _ => top,
    }
}
