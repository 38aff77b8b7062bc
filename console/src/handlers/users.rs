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

use super::{DeleteResponse, LiveKitCredentialsBody, required};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{Agent, User, UserRole};
use crate::state::AppState;
use crate::store::{Record, new_id, strip_masked_secret};
use crate::utils::validate_livekit_url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub role: Option<UserRole>,
    pub plan: Option<String>,
    pub livekit: Option<LiveKitCredentialsBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAssignmentRequest {
    pub agent_id: Option<String>,
}

impl AgentAssignmentRequest {
    fn agent_id(&self) -> AppResult<&str> {
        required(self.agent_id.as_deref()).ok_or_else(|| AppError::bad_request("agentId is required"))
    }
}

/// List users with LiveKit secrets masked
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    let mut users: Vec<User> = state.users.list().iter().map(User::masked).collect();
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(users)
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let email = required(body.email.as_deref());
    let name = required(body.name.as_deref());
    let (Some(email), Some(name)) = (email, name) else {
        return Err(AppError::bad_request("Email and name are required"));
    };

    let mut user = User::new(new_id("user"), email, name, Utc::now());
    user.company = body.company;
    user.role = body.role.unwrap_or_default();
    if let Some(plan) = body.plan {
        user.plan = plan;
    }
    if let Some(livekit) = &body.livekit {
        user.livekit = Some(livekit.complete().ok_or_else(|| {
            AppError::bad_request("apiKey, apiSecret, and wsUrl are required")
        })?);
    }
    user.validate().map_err(AppError::BadRequest)?;

    state.users.insert(user.clone());
    info!(user_id = %user.id, role = ?user.role, "Created user");

    Ok((StatusCode::CREATED, Json(user.masked())))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    state.user(&id).map(|user| Json(user.masked()))
}

/// Deep-merge a partial user. A masked secret sent back unchanged keeps the stored one.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(mut patch): JsonBody<Value>,
) -> AppResult<Json<User>> {
    strip_masked_secret(&mut patch, "livekit", "apiSecret");
    // Ownership moves through the assignment endpoints
    if let Value::Object(map) = &mut patch {
        map.remove("agentIds");
    }

    let user = state
        .users
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %id, "Updated user");
    Ok(Json(user.masked()))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.users.remove(&id) {
        return Err(AppError::NotFound("User"));
    }
    info!(user_id = %id, "Deleted user");
    Ok(Json(DeleteResponse::ok()))
}

/// Replace the user's own LiveKit project credentials
pub async fn set_user_livekit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<LiveKitCredentialsBody>,
) -> AppResult<Json<User>> {
    let credentials = body
        .complete()
        .ok_or_else(|| AppError::bad_request("apiKey, apiSecret, and wsUrl are required"))?;
    validate_livekit_url(&credentials.ws_url)
        .map_err(|e| AppError::bad_request(format!("Invalid wsUrl: {e}")))?;

    let user = state
        .users
        .modify(&id, &mut |user| user.livekit = Some(credentials.clone()))
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %id, "Updated user LiveKit credentials");
    Ok(Json(user.masked()))
}

pub async fn clear_user_livekit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .modify(&id, &mut |user| user.livekit = None)
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %id, "Cleared user LiveKit credentials");
    Ok(Json(user.masked()))
}

/// Agents owned by the user
pub async fn list_user_agents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Agent>>> {
    state.agents_owned_by(&id).map(Json)
}

pub async fn assign_user_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AgentAssignmentRequest>,
) -> AppResult<Json<User>> {
    let user = state.assign_agent_to_user(&id, body.agent_id()?)?;
    Ok(Json(user.masked()))
}

pub async fn remove_user_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AgentAssignmentRequest>,
) -> AppResult<Json<User>> {
    let user = state.remove_agent_from_user(&id, body.agent_id()?)?;
    Ok(Json(user.masked()))
}
