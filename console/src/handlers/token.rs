use axum::{Extension, Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{LiveKitCredentialsBody, required};
use crate::auth::Auth;
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::livekit::{IssuedToken, issue_agent_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub agent_id: Option<String>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    /// Explicit credentials, used only when complete
    pub livekit: Option<LiveKitCredentialsBody>,
}

/// Issue a LiveKit access token for a new room with the requested agent
pub async fn generate_token(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    JsonBody(body): JsonBody<TokenRequest>,
) -> AppResult<Json<IssuedToken>> {
    let agent_id = required(body.agent_id.as_deref())
        .ok_or_else(|| AppError::bad_request("Agent ID is required"))?;

    let agent = state.agent(agent_id)?;
    if !agent.is_active() {
        return Err(AppError::bad_request("Agent is not active"));
    }

    let chain = state.credential_chain(
        &agent,
        body.livekit.as_ref().and_then(LiveKitCredentialsBody::complete),
        required(body.user_id.as_deref()),
    );
    let (issued, source) = issue_agent_token(&agent, body.user_name.as_deref(), chain, Utc::now())?;

    info!(
        agent_id = %agent.id,
        room_name = %issued.room_name,
        participant = %issued.participant_identity,
        credential_source = %source,
        api_secret_id = ?auth.id,
        "Issued LiveKit token"
    );
    Ok(Json(issued))
}
