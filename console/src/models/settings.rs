use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LiveKitCredentials, mask_secret};

/// Platform-wide credentials, a single instance per process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub livekit: Option<LiveKitCredentials>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio_account_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio_auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telnyx_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vonage_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vonage_api_secret: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl PlatformSettings {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            livekit: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            telnyx_api_key: None,
            vonage_api_key: None,
            vonage_api_secret: None,
            updated_at: now,
        }
    }

    /// Copy with every secret replaced by the mask. Account ids and API keys stay readable.
    pub fn masked(&self) -> Self {
        Self {
            livekit: self.livekit.as_ref().map(LiveKitCredentials::masked),
            twilio_account_sid: self.twilio_account_sid.clone(),
            twilio_auth_token: mask_secret(&self.twilio_auth_token),
            telnyx_api_key: mask_secret(&self.telnyx_api_key),
            vonage_api_key: self.vonage_api_key.clone(),
            vonage_api_secret: mask_secret(&self.vonage_api_secret),
            updated_at: self.updated_at,
        }
    }

    pub fn complete_livekit(&self) -> Option<&LiveKitCredentials> {
        self.livekit.as_ref().filter(|c| c.is_complete())
    }
}
