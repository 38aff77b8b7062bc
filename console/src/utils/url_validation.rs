//! URL validation for configured endpoints
//!
//! The console never dials these URLs itself; it stores them and hands them to
//! browsers and agents. Validation only guarantees they are well formed and use
//! a scheme the consumer can speak.

use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation
#[derive(Debug, Error, PartialEq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("Unsupported URL scheme '{scheme}', expected one of: {expected}")]
    UnsupportedScheme {
        scheme: String,
        expected: &'static str,
    },

    #[error("URL must have a host")]
    MissingHost,
}

fn validate_with_schemes(
    raw: &str,
    schemes: &[&str],
    expected: &'static str,
) -> Result<Url, UrlValidationError> {
    let url = Url::parse(raw.trim())?;

    if !schemes.contains(&url.scheme()) {
        return Err(UrlValidationError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            expected,
        });
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

/// Validate a LiveKit server URL (`wss://my-project.livekit.cloud`)
///
/// HTTP schemes are accepted as well since the server SDK and the browser
/// client both derive the other form.
pub fn validate_livekit_url(raw: &str) -> Result<Url, UrlValidationError> {
    validate_with_schemes(raw, &["ws", "wss", "http", "https"], "ws, wss, http, https")
}

/// Validate an outbound webhook or custom endpoint URL
pub fn validate_http_url(raw: &str) -> Result<Url, UrlValidationError> {
    validate_with_schemes(raw, &["http", "https"], "http, https")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livekit_url_schemes() {
        assert!(validate_livekit_url("wss://demo.livekit.cloud").is_ok());
        assert!(validate_livekit_url("ws://localhost:7880").is_ok());
        assert!(validate_livekit_url("https://demo.livekit.cloud").is_ok());

        assert!(matches!(
            validate_livekit_url("ftp://demo.livekit.cloud"),
            Err(UrlValidationError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            validate_livekit_url("demo.livekit.cloud"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_http_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_host() {
        assert!(validate_livekit_url("wss://").is_err());
    }

    #[test]
    fn test_http_url_rejects_websocket() {
        assert!(validate_http_url("https://hooks.example.com/call-ended").is_ok());
        let err = validate_http_url("wss://hooks.example.com").unwrap_err();
        assert!(err.to_string().contains("http, https"));
    }
}
