use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{DeleteResponse, required};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{Capability, PhoneNumber, PhoneNumberStatus, TelephonyProvider};
use crate::state::AppState;
use crate::store::{Record, new_id};
use crate::utils::normalize_phone_number;

const DEFAULT_COUNTRY: &str = "US";
const DEFAULT_MONTHLY_COST: f64 = 1.00;
const DEFAULT_PER_MINUTE_COST: f64 = 0.0085;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhoneNumberRequest {
    pub number: Option<String>,
    pub sip_trunk_id: Option<String>,
    pub formatted_number: Option<String>,
    pub provider: Option<TelephonyProvider>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub capabilities: Option<Vec<Capability>>,
    pub assigned_agent_id: Option<String>,
    pub inbound_enabled: Option<bool>,
    pub outbound_enabled: Option<bool>,
    pub outbound_caller_id: Option<String>,
    pub monthly_cost: Option<f64>,
    pub per_minute_cost: Option<f64>,
    pub status: Option<PhoneNumberStatus>,
    pub purchased_at: Option<DateTime<Utc>>,
}

pub async fn list_phone_numbers(State(state): State<Arc<AppState>>) -> Json<Vec<PhoneNumber>> {
    let mut numbers = state.phone_numbers.list();
    numbers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(numbers)
}

/// Register a number. Omitted fields take the carrier defaults.
pub async fn create_phone_number(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CreatePhoneNumberRequest>,
) -> AppResult<impl IntoResponse> {
    let number = required(body.number.as_deref());
    let sip_trunk_id = required(body.sip_trunk_id.as_deref());
    let (Some(number), Some(sip_trunk_id)) = (number, sip_trunk_id) else {
        return Err(AppError::bad_request(
            "Phone number and SIP trunk ID are required",
        ));
    };

    if let Some(agent_id) = &body.assigned_agent_id {
        state.agent(agent_id)?;
    }

    let now = Utc::now();
    let number = normalize_phone_number(number);
    let phone_number = PhoneNumber {
        id: new_id("pn"),
        formatted_number: body.formatted_number.unwrap_or_else(|| number.clone()),
        number,
        provider: body.provider.unwrap_or_default(),
        country: body.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        region: body.region,
        capabilities: body.capabilities.unwrap_or_else(|| vec![Capability::Voice]),
        assigned_agent_id: body.assigned_agent_id,
        sip_trunk_id: Some(sip_trunk_id.to_string()),
        inbound_enabled: body.inbound_enabled.unwrap_or(true),
        outbound_enabled: body.outbound_enabled.unwrap_or(true),
        outbound_caller_id: body.outbound_caller_id,
        monthly_cost: body.monthly_cost.unwrap_or(DEFAULT_MONTHLY_COST),
        per_minute_cost: body.per_minute_cost.unwrap_or(DEFAULT_PER_MINUTE_COST),
        status: body.status.unwrap_or_default(),
        purchased_at: body.purchased_at.unwrap_or(now),
        created_at: now,
    };
    phone_number.validate().map_err(AppError::BadRequest)?;

    state.phone_numbers.insert(phone_number.clone());
    state.sync_phone_assignment(
        &phone_number.id,
        None,
        phone_number.assigned_agent_id.as_deref(),
    );
    info!(
        phone_number_id = %phone_number.id,
        number = %phone_number.number,
        agent_id = ?phone_number.assigned_agent_id,
        "Created phone number"
    );

    Ok((StatusCode::CREATED, Json(phone_number)))
}

pub async fn get_phone_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<PhoneNumber>> {
    state
        .phone_numbers
        .get(&id)
        .map(Json)
        .ok_or(AppError::NotFound("Phone number"))
}

/// Deep-merge a partial phone number; a changed `assignedAgentId` moves the
/// number between agents. `number` is normalized as on create.
pub async fn update_phone_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(mut patch): JsonBody<Value>,
) -> AppResult<Json<PhoneNumber>> {
    if let Some(number) = patch.get_mut("number") {
        if let Some(raw) = number.as_str() {
            *number = Value::String(normalize_phone_number(raw));
        }
    }

    let previous = state
        .phone_numbers
        .get(&id)
        .ok_or(AppError::NotFound("Phone number"))?;

    if let Some(agent_id) = patch.get("assignedAgentId").and_then(Value::as_str) {
        state.agent(agent_id)?;
    }

    let updated = state
        .phone_numbers
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("Phone number"))?;

    state.sync_phone_assignment(
        &id,
        previous.assigned_agent_id.as_deref(),
        updated.assigned_agent_id.as_deref(),
    );
    info!(phone_number_id = %id, agent_id = ?updated.assigned_agent_id, "Updated phone number");
    Ok(Json(updated))
}

pub async fn delete_phone_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.phone_numbers.remove(&id) {
        return Err(AppError::NotFound("Phone number"));
    }
    info!(phone_number_id = %id, "Deleted phone number");
    Ok(Json(DeleteResponse::ok()))
}
