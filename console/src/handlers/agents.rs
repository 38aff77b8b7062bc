use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{DeleteResponse, required};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{Agent, AgentStatus};
use crate::state::AppState;
use crate::store::{Record, merge_onto, sanitize_patch};

/// List all agents, oldest first
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<Agent>> {
    let mut agents = state.agents.list();
    agents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(agents)
}

/// Create an agent
///
/// The id is the slug of `name`. Configuration blocks in the body are merged
/// onto the defaults, so a body may carry only the fields it cares about.
/// New agents always start `active`.
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<impl IntoResponse> {
    let name = required(body.get("name").and_then(Value::as_str));
    let display_name = required(body.get("displayName").and_then(Value::as_str));
    let (Some(name), Some(display_name)) = (name, display_name) else {
        return Err(AppError::bad_request("Name and display name are required"));
    };

    let owner_id = body
        .get("ownerId")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(owner_id) = &owner_id {
        state.user(owner_id)?;
    }

    let id = Agent::slug(name);
    let defaults = Agent::new(id.as_str(), name, display_name, Utc::now());
    let overrides = Value::Object(sanitize_patch(&body)?);
    let mut agent: Agent = merge_onto(&defaults, Some(&overrides), "agent")?;
    agent.owner_id = None;
    agent.status = AgentStatus::Active;
    agent.validate().map_err(AppError::BadRequest)?;

    if state.agents.insert(agent.clone()).is_some() {
        warn!(agent_id = %id, "Agent id collision, replacing existing agent");
    }
    info!(agent_id = %id, name = %agent.name, "Created agent");

    if let Some(owner_id) = owner_id {
        state.assign_agent_to_user(&owner_id, &id)?;
        agent = state.agent(&id)?;
    }

    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Agent>> {
    state.agent(&id).map(Json)
}

/// Deep-merge a partial agent onto the stored one
///
/// `phoneNumberIds` is owned by the phone number endpoints and is ignored.
/// An `ownerId` string or null moves ownership through the same path as the
/// user assignment endpoints so both sides stay in step.
pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(mut patch): JsonBody<Value>,
) -> AppResult<Json<Agent>> {
    let owner_change = match &mut patch {
        Value::Object(map) => {
            map.remove("phoneNumberIds");
            map.remove("ownerId")
        }
        _ => None,
    };
    let new_owner = match &owner_change {
        Some(Value::String(owner_id)) => Some(state.user(owner_id)?.id),
        Some(Value::Null) | None => None,
        Some(_) => return Err(AppError::bad_request("ownerId must be a string or null")),
    };

    let agent = state
        .agents
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("Agent"))?;

    let agent = if owner_change.is_some() && agent.owner_id != new_owner {
        if let Some(previous) = agent.owner_id.as_deref() {
            if let Err(e) = state.remove_agent_from_user(previous, &id) {
                debug!(agent_id = %id, owner_id = %previous, error = %e, "Previous owner already gone");
            }
        }
        match new_owner.as_deref() {
            Some(owner_id) => {
                state.assign_agent_to_user(owner_id, &id)?;
            }
            None => {
                state.agents.modify(&id, &mut |agent| agent.owner_id = None);
            }
        }
        state.agent(&id)?
    } else {
        agent
    };

    info!(agent_id = %id, owner_id = ?agent.owner_id, "Updated agent");
    Ok(Json(agent))
}

pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.agents.remove(&id) {
        return Err(AppError::NotFound("Agent"));
    }
    info!(agent_id = %id, "Deleted agent");
    Ok(Json(DeleteResponse::ok()))
}
