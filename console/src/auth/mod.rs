//! Caller identity for authenticated API requests

use subtle::ConstantTimeEq;

use crate::config::AuthApiSecret;

/// Authentication context inserted into request extensions by the auth middleware
///
/// Handlers that start billable work (token issuance, outbound calls) read it
/// with `Extension<Auth>` and log `id`, the configured identifier of the API
/// secret the caller presented, or `None` when authentication is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    pub id: Option<String>,
}

impl Auth {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Context used when authentication is disabled
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Match a bearer token against the configured API secrets
///
/// Every entry is compared in constant time so the response time does not
/// reveal which secret, or how much of one, matched.
pub fn match_api_secret_id<'a>(token: &str, secrets: &'a [AuthApiSecret]) -> Option<&'a str> {
    let mut matched = None;
    for entry in secrets {
        let equal: bool = entry.secret.as_bytes().ct_eq(token.as_bytes()).into();
        if equal && matched.is_none() {
            matched = Some(entry.id.as_str());
        }
    }
    matched
}
