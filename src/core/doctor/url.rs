//! Health URL validation for configured checks
//!
//! The probe itself never validates URLs (malformed ones surface as
//! `InvalidURLError` results); this is used when checking a config file.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Unsupported scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
    #[error("Missing host in URL")]
    MissingHost,
}

/// Parse a health URL, requiring an http(s) scheme and a host
///
/// # Examples
/// - `http://127.0.0.1:8080/v1/health` → Ok
/// - `ftp://example.test/health` → `UnsupportedScheme("ftp")`
/// - `not a url` → `ParseError`
pub fn validate_health_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
