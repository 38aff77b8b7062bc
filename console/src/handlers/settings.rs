use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{LiveKitCredentialsBody, required};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::livekit::test_credentials;
use crate::models::{LiveKitCredentials, PlatformSettings};
use crate::state::AppState;
use crate::utils::validate_livekit_url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwilioCredentialsBody {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelnyxCredentialsBody {
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VonageCredentialsBody {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

/// Each block is optional, but a present block must be complete
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub livekit: Option<LiveKitCredentialsBody>,
    pub twilio: Option<TwilioCredentialsBody>,
    pub telnyx: Option<TelnyxCredentialsBody>,
    pub vonage: Option<VonageCredentialsBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveKitTestResponse {
    pub success: bool,
    pub message: &'static str,
    pub ws_url: String,
    pub token_generated: bool,
}

fn livekit_from_body(body: &LiveKitCredentialsBody, message: &str) -> AppResult<LiveKitCredentials> {
    let credentials = body.complete().ok_or_else(|| AppError::bad_request(message))?;
    validate_livekit_url(&credentials.ws_url)
        .map_err(|e| AppError::bad_request(format!("Invalid wsUrl: {e}")))?;
    Ok(credentials)
}

/// Platform settings with secrets masked
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<PlatformSettings> {
    Json(state.settings.get().masked())
}

/// Update any subset of provider credentials
///
/// Every block is checked before anything is written, so a bad block leaves
/// the settings untouched.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<UpdateSettingsRequest>,
) -> AppResult<Json<PlatformSettings>> {
    let livekit = body
        .livekit
        .as_ref()
        .map(|lk| livekit_from_body(lk, "LiveKit requires apiKey, apiSecret, and wsUrl"))
        .transpose()?;

    let twilio = body
        .twilio
        .as_ref()
        .map(|t| {
            match (required(t.account_sid.as_deref()), required(t.auth_token.as_deref())) {
                (Some(sid), Some(token)) => Ok((sid.to_string(), token.to_string())),
                _ => Err(AppError::bad_request("Twilio requires accountSid and authToken")),
            }
        })
        .transpose()?;

    let telnyx = body
        .telnyx
        .as_ref()
        .map(|t| {
            required(t.api_key.as_deref())
                .map(str::to_string)
                .ok_or_else(|| AppError::bad_request("Telnyx requires apiKey"))
        })
        .transpose()?;

    let vonage = body
        .vonage
        .as_ref()
        .map(|v| {
            match (required(v.api_key.as_deref()), required(v.api_secret.as_deref())) {
                (Some(key), Some(secret)) => Ok((key.to_string(), secret.to_string())),
                _ => Err(AppError::bad_request("Vonage requires apiKey and apiSecret")),
            }
        })
        .transpose()?;

    let updated = state.settings.update(|settings| {
        if let Some(livekit) = livekit {
            settings.livekit = Some(livekit);
        }
        if let Some((sid, token)) = twilio {
            settings.twilio_account_sid = Some(sid);
            settings.twilio_auth_token = Some(token);
        }
        if let Some(key) = telnyx {
            settings.telnyx_api_key = Some(key);
        }
        if let Some((key, secret)) = vonage {
            settings.vonage_api_key = Some(key);
            settings.vonage_api_secret = Some(secret);
        }
    });

    info!(
        livekit = updated.livekit.is_some(),
        twilio = updated.twilio_account_sid.is_some(),
        telnyx = updated.telnyx_api_key.is_some(),
        vonage = updated.vonage_api_key.is_some(),
        "Updated platform settings"
    );
    Ok(Json(updated.masked()))
}

pub async fn set_platform_livekit(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LiveKitCredentialsBody>,
) -> AppResult<Json<PlatformSettings>> {
    let credentials = livekit_from_body(&body, "apiKey, apiSecret, and wsUrl are required")?;
    let updated = state.settings.set_livekit(Some(credentials));
    info!("Updated platform LiveKit credentials");
    Ok(Json(updated.masked()))
}

pub async fn clear_platform_livekit(State(state): State<Arc<AppState>>) -> Json<PlatformSettings> {
    let updated = state.settings.set_livekit(None);
    info!("Removed platform LiveKit credentials");
    Json(updated.masked())
}

/// Prove a credential set can sign tokens
///
/// Uses the body's credentials when complete, otherwise the platform ones.
/// The body is optional and an unparseable body counts as absent.
pub async fn test_livekit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<LiveKitTestResponse>> {
    let supplied = serde_json::from_slice::<LiveKitCredentialsBody>(&body)
        .ok()
        .and_then(|b| b.complete());

    let credentials = supplied
        .or_else(|| state.settings.livekit())
        .ok_or_else(|| AppError::bad_request("No LiveKit credentials configured"))?;

    let token = test_credentials(&credentials).map_err(|e| {
        warn!(error = %e, "LiveKit connection test failed");
        AppError::bad_request(format!("LiveKit connection test failed: {e}"))
    })?;

    Ok(Json(LiveKitTestResponse {
        success: true,
        message: "LiveKit credentials are valid",
        ws_url: credentials.ws_url.clone(),
        token_generated: !token.is_empty(),
    }))
}
