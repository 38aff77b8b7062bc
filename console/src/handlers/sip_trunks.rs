use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{DeleteResponse, required};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{SipTrunk, TelephonyProvider, TrunkStatus, TrunkType};
use crate::state::AppState;
use crate::store::{new_id, strip_masked_secret};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSipTrunkRequest {
    pub name: Option<String>,
    pub provider: Option<TelephonyProvider>,
    #[serde(rename = "type")]
    pub trunk_type: Option<TrunkType>,
    pub trunk_sid: Option<String>,
    pub termination_uri: Option<String>,
    pub origination_uri: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub livekit_sip_uri: Option<String>,
    pub status: Option<TrunkStatus>,
}

/// Every response masks the trunk password
pub async fn list_sip_trunks(State(state): State<Arc<AppState>>) -> Json<Vec<SipTrunk>> {
    let mut trunks: Vec<SipTrunk> = state.sip_trunks.list().iter().map(SipTrunk::masked).collect();
    trunks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(trunks)
}

pub async fn create_sip_trunk(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CreateSipTrunkRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(name), Some(provider)) = (required(body.name.as_deref()), body.provider) else {
        return Err(AppError::bad_request("Name and provider are required"));
    };

    let now = Utc::now();
    let trunk = SipTrunk {
        id: new_id("trunk"),
        name: name.to_string(),
        provider,
        trunk_type: body.trunk_type.unwrap_or_default(),
        trunk_sid: body.trunk_sid,
        termination_uri: body.termination_uri,
        origination_uri: body.origination_uri,
        username: body.username,
        password: body.password,
        livekit_sip_uri: body.livekit_sip_uri,
        status: body.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    state.sip_trunks.insert(trunk.clone());
    info!(trunk_id = %trunk.id, provider = ?trunk.provider, "Created SIP trunk");

    Ok((StatusCode::CREATED, Json(trunk.masked())))
}

pub async fn get_sip_trunk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<SipTrunk>> {
    state
        .sip_trunks
        .get(&id)
        .map(|trunk| Json(trunk.masked()))
        .ok_or(AppError::NotFound("SIP trunk"))
}

pub async fn update_sip_trunk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(mut patch): JsonBody<Value>,
) -> AppResult<Json<SipTrunk>> {
    strip_masked_secret(&mut patch, "", "password");

    let trunk = state
        .sip_trunks
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("SIP trunk"))?;
    info!(trunk_id = %id, "Updated SIP trunk");
    Ok(Json(trunk.masked()))
}

pub async fn delete_sip_trunk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.sip_trunks.remove(&id) {
        return Err(AppError::NotFound("SIP trunk"));
    }
    info!(trunk_id = %id, "Deleted SIP trunk");
    Ok(Json(DeleteResponse::ok()))
}
