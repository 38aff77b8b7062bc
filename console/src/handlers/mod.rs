//! HTTP request handlers
//!
//! - `api` - health check
//! - `agents`, `users`, `phone_numbers`, `sip_trunks` - resource CRUD
//! - `outbound_calls` - outbound call log and queueing
//! - `token` - LiveKit access tokens for browser sessions
//! - `settings` - platform credentials
//! - `analytics` - call aggregation and call records

pub mod agents;
pub mod analytics;
pub mod api;
pub mod outbound_calls;
pub mod phone_numbers;
pub mod settings;
pub mod sip_trunks;
pub mod token;
pub mod users;

use serde::Serialize;

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Trimmed, non-empty value of an optional body field
pub(crate) fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// LiveKit credentials as submitted, before completeness is checked
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveKitCredentialsBody {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub ws_url: Option<String>,
}

impl LiveKitCredentialsBody {
    /// Credentials when all three fields are non-empty
    pub fn complete(&self) -> Option<crate::models::LiveKitCredentials> {
        let api_key = required(self.api_key.as_deref())?;
        let api_secret = required(self.api_secret.as_deref())?;
        let ws_url = required(self.ws_url.as_deref())?;
        Some(crate::models::LiveKitCredentials::new(api_key, api_secret, ws_url))
    }
}
