use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::required;
use crate::analytics::outbound_stats;
use crate::auth::Auth;
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{OutboundCall, OutboundCallStats, OutboundCallStatus};
use crate::state::AppState;
use crate::store::{Record, new_id};
use crate::utils::{normalize_phone_number, validate_phone_number};

#[derive(Debug, Default, Deserialize)]
pub struct OutboundCallsQuery {
    #[serde(default)]
    pub stats: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutboundCallsWithStats {
    pub calls: Vec<OutboundCall>,
    pub stats: OutboundCallStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutboundCallRequest {
    pub agent_id: Option<String>,
    pub to_number: Option<String>,
    pub from_number_id: Option<String>,
    pub custom_caller_id: Option<String>,
    pub dtmf_sequence: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Outbound call log, newest first. `?stats=true` wraps it with aggregate stats.
pub async fn list_outbound_calls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OutboundCallsQuery>,
) -> Response {
    let mut calls = state.outbound_calls.list();
    calls.sort_by(|a, b| b.queued_at.cmp(&a.queued_at));

    if query.stats.as_deref() == Some("true") {
        let stats = outbound_stats(&calls);
        Json(OutboundCallsWithStats { calls, stats }).into_response()
    } else {
        Json(calls).into_response()
    }
}

/// Queue a call from one of the platform's numbers
///
/// Dialing happens out of band; the record starts as `queued`.
pub async fn create_outbound_call(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    JsonBody(body): JsonBody<CreateOutboundCallRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(agent_id), Some(to_number), Some(from_number_id)) = (
        required(body.agent_id.as_deref()),
        required(body.to_number.as_deref()),
        required(body.from_number_id.as_deref()),
    ) else {
        return Err(AppError::bad_request(
            "agentId, toNumber, and fromNumberId are required",
        ));
    };

    let to_number = normalize_phone_number(to_number);
    validate_phone_number(&to_number).map_err(AppError::BadRequest)?;

    state.agent(agent_id)?;
    let from = state
        .phone_numbers
        .get(from_number_id)
        .ok_or(AppError::NotFound("Phone number"))?;
    if !from.outbound_enabled {
        return Err(AppError::bad_request(
            "Phone number is not enabled for outbound calls",
        ));
    }

    let call = OutboundCall {
        id: new_id("oc"),
        agent_id: agent_id.to_string(),
        to_number,
        from_number: from.number.clone(),
        caller_id: body.custom_caller_id.or(from.outbound_caller_id),
        status: OutboundCallStatus::Queued,
        queued_at: Utc::now(),
        dialed_at: None,
        answered_at: None,
        ended_at: None,
        duration: None,
        room_name: None,
        sip_participant_id: None,
        end_reason: None,
        error_message: None,
        cost: None,
        dtmf_sequence: body.dtmf_sequence,
        metadata: body.metadata,
    };

    state.outbound_calls.insert(call.clone());
    info!(
        call_id = %call.id,
        agent_id = %call.agent_id,
        from = %call.from_number,
        api_secret_id = ?auth.id,
        "Queued outbound call"
    );

    Ok((StatusCode::CREATED, Json(call)))
}

pub async fn get_outbound_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<OutboundCall>> {
    state
        .outbound_calls
        .get(&id)
        .map(Json)
        .ok_or(AppError::NotFound("Outbound call"))
}

/// Deep-merge lifecycle changes reported by the dialer, e.g.
/// `{"status": "completed", "endedAt": ..., "duration": 95}`
pub async fn update_outbound_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> AppResult<Json<OutboundCall>> {
    let call = state
        .outbound_calls
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("Outbound call"))?;
    info!(call_id = %id, status = ?call.status, "Updated outbound call");
    Ok(Json(call))
}
