use jarvis_doctor::core::doctor::classify::{
    classify_curl_error, classify_error_chain, classify_io_kind, classify_isahc_error,
    classify_message, describe_error_chain,
};
use jarvis_doctor::core::doctor::client::TransportError;
use jarvis_doctor::core::doctor::types::FailureKind;
use std::io;

/// Wrapper error whose source is an io error, like a client error type would be
#[derive(Debug, thiserror::Error)]
#[error("request failed")]
struct WrappedError {
    #[source]
    source: io::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TextError(String);

/// Client error carrying a raw libcurl result, the way isahc does
#[derive(Debug, thiserror::Error)]
#[error("unknown error")]
struct CurlBackedError {
    #[source]
    source: curl::Error,
}

#[test]
fn test_classify_io_kind() {
    assert_eq!(classify_io_kind(io::ErrorKind::ConnectionReset), Some(FailureKind::ConnectionReset));
    assert_eq!(classify_io_kind(io::ErrorKind::ConnectionRefused), Some(FailureKind::ConnectionRefused));
    assert_eq!(classify_io_kind(io::ErrorKind::ConnectionAborted), Some(FailureKind::ConnectionAborted));
    assert_eq!(classify_io_kind(io::ErrorKind::BrokenPipe), Some(FailureKind::ConnectionAborted));
    assert_eq!(classify_io_kind(io::ErrorKind::TimedOut), Some(FailureKind::Timeout));
    assert_eq!(classify_io_kind(io::ErrorKind::InvalidInput), Some(FailureKind::InvalidUrl));
    assert_eq!(classify_io_kind(io::ErrorKind::Other), None);
}

#[test]
fn test_classify_curl_messages() {
    let cases = [
        ("Recv failure: Connection reset by peer", FailureKind::ConnectionReset),
        ("Failed to connect to 127.0.0.1 port 1: Connection refused", FailureKind::ConnectionRefused),
        ("Operation timed out after 5000 milliseconds", FailureKind::Timeout),
        ("Could not resolve host: example.test", FailureKind::NameResolution),
        ("SSL certificate problem: unable to get local issuer certificate", FailureKind::Tls),
        ("Send failure: Broken pipe", FailureKind::ConnectionAborted),
        ("[56] Failure when receiving data from the peer", FailureKind::ConnectionReset),
        ("[55] Failure when sending data to the peer", FailureKind::ConnectionReset),
        ("[52] Empty reply from server", FailureKind::RemoteDisconnected),
        ("[7] Couldn't connect to server", FailureKind::ConnectionRefused),
    ];

    for (message, expected) in cases {
        assert_eq!(classify_message(message), Some(expected), "message: {}", message);
    }
    assert_eq!(classify_message("something odd happened"), None);
}

#[test]
fn test_reset_wins_over_refused_text() {
    // Both words appear; reset is the more specific category
    assert_eq!(
        classify_message("connection reset while connection refused retry pending"),
        Some(FailureKind::ConnectionReset)
    );
}

#[test]
fn test_classify_error_chain_prefers_io_kind() {
    let err = WrappedError {
        source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
    };
    assert_eq!(classify_error_chain(&err), Some(FailureKind::ConnectionReset));
}

#[test]
fn test_classify_error_chain_falls_back_to_text() {
    let err = TextError("Could not resolve host: nowhere.invalid".to_string());
    assert_eq!(classify_error_chain(&err), Some(FailureKind::NameResolution));

    let err = TextError("unexpected EOF".to_string());
    assert_eq!(classify_error_chain(&err), None);
}

#[test]
fn test_transport_error_from_io_error() {
    let err = TransportError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
    assert_eq!(err.kind, FailureKind::ConnectionReset);
    assert_eq!(err.message, "reset");
    assert_eq!(err.to_string(), "ConnectionResetError: reset");

    // Generic io kind with descriptive text is still classified
    let err = TransportError::from(io::Error::new(io::ErrorKind::Other, "Connection reset by peer"));
    assert_eq!(err.kind, FailureKind::ConnectionReset);

    let err = TransportError::from(io::Error::new(io::ErrorKind::Other, "weird"));
    assert_eq!(err.kind, FailureKind::Transport);
}

#[test]
fn test_failure_kind_labels_are_distinct() {
    let kinds = [
        FailureKind::ConnectionReset,
        FailureKind::ConnectionRefused,
        FailureKind::ConnectionAborted,
        FailureKind::RemoteDisconnected,
        FailureKind::Timeout,
        FailureKind::NameResolution,
        FailureKind::Tls,
        FailureKind::InvalidUrl,
        FailureKind::Protocol,
        FailureKind::HttpStatus,
        FailureKind::Transport,
    ];
    let labels: std::collections::HashSet<_> = kinds.iter().map(|k| k.label()).collect();
    assert_eq!(labels.len(), kinds.len());
    assert_eq!(FailureKind::ConnectionReset.to_string(), "ConnectionResetError");
}

#[test]
fn test_classify_curl_codes() {
    let cases = [
        (56, FailureKind::ConnectionReset),
        (55, FailureKind::ConnectionReset),
        (52, FailureKind::RemoteDisconnected),
        (7, FailureKind::ConnectionRefused),
        (6, FailureKind::NameResolution),
        (28, FailureKind::Timeout),
        (3, FailureKind::InvalidUrl),
        (47, FailureKind::Protocol),
    ];

    for (code, expected) in cases {
        assert_eq!(
            classify_curl_error(&curl::Error::new(code)),
            Some(expected),
            "curl code: {}",
            code
        );
    }
    // CURLE_WRITE_ERROR names no category of its own
    assert_eq!(classify_curl_error(&curl::Error::new(23)), None);
}

#[test]
fn test_curl_code_found_through_source_chain() {
    // Top-level text says nothing; the code underneath decides
    let err = CurlBackedError {
        source: curl::Error::new(56),
    };
    assert_eq!(classify_error_chain(&err), Some(FailureKind::ConnectionReset));
}

#[test]
fn test_describe_error_chain() {
    let err = WrappedError {
        source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
    };
    assert_eq!(describe_error_chain(&err), "request failed (reset)");

    // Undescribed top-level text is replaced by the cause
    let err = CurlBackedError {
        source: curl::Error::new(56),
    };
    let described = describe_error_chain(&err);
    assert!(described.starts_with("[56] "), "described: {}", described);
    assert!(!described.contains("unknown error"));

    let err = TextError("plain".to_string());
    assert_eq!(describe_error_chain(&err), "plain");
}

#[test]
fn test_connection_failed_without_detail_is_not_refused() {
    use isahc::error::ErrorKind;

    let err = isahc::Error::from(ErrorKind::ConnectionFailed);
    assert_eq!(classify_isahc_error(&err), FailureKind::Transport);

    let err = isahc::Error::from(ErrorKind::Timeout);
    assert_eq!(classify_isahc_error(&err), FailureKind::Timeout);
}

#[test]
fn test_transport_error_from_isahc_error() {
    let err = TransportError::from(isahc::Error::from(isahc::error::ErrorKind::NameResolution));
    assert_eq!(err.kind, FailureKind::NameResolution);
    assert_eq!(err.to_string(), "NameResolutionError: failed to resolve host name");
}
