use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::analytics::{DEFAULT_DAYS, MAX_DAYS, agent_stats, daily_stats, sort_calls_desc, summarize};
use crate::errors::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{AgentAnalytics, AnalyticsSummary, CallRecord, DailyStats, Period};
use crate::state::AppState;
use crate::store::{Record, new_id, sanitize_patch};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub daily_stats: Vec<DailyStats>,
    pub agent_stats: Vec<AgentAnalytics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsQuery {
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallsPage {
    pub calls: Vec<CallRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Parse an optional numeric query parameter
fn parse_param<T: FromStr>(raw: Option<&str>, name: &str, default: T) -> AppResult<T> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::bad_request(format!("Invalid {name} '{value}'"))),
    }
}

/// Summary for the period, daily series and per-agent breakdown
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsResponse>> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<Period>().map_err(AppError::BadRequest)?,
        None => Period::default(),
    };
    let days = parse_param(query.days.as_deref(), "days", i64::from(DEFAULT_DAYS))?
        .clamp(1, i64::from(MAX_DAYS)) as u32;

    let calls = state.calls.list();
    let now = Utc::now();
    let response = AnalyticsResponse {
        summary: summarize(&calls, period, now),
        daily_stats: daily_stats(&calls, days, now),
        agent_stats: agent_stats(&calls, |id| state.agents.get(id).map(|a| a.name)),
    };
    Ok(Json(response))
}

/// Paged call history, newest first
pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallsQuery>,
) -> AppResult<Json<CallsPage>> {
    let limit = parse_param(query.limit.as_deref(), "limit", DEFAULT_LIMIT)?.min(MAX_LIMIT);
    let offset = parse_param(query.offset.as_deref(), "offset", 0usize)?;

    let mut calls: Vec<CallRecord> = state
        .calls
        .list()
        .into_iter()
        .filter(|c| query.agent_id.as_deref().is_none_or(|id| c.agent_id == id))
        .filter(|c| query.user_id.as_deref().is_none_or(|id| c.user_id == id))
        .collect();
    sort_calls_desc(&mut calls);

    let total = calls.len();
    let calls = calls.into_iter().skip(offset).take(limit).collect();
    Ok(Json(CallsPage {
        calls,
        total,
        limit,
        offset,
    }))
}

/// Record a finished or in-flight call
pub async fn create_call(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<impl IntoResponse> {
    let mut fields = sanitize_patch(&body)?;
    for key in ["agentId", "roomName", "startedAt"] {
        if fields.get(key).is_none_or(Value::is_null) {
            return Err(AppError::bad_request(
                "agentId, roomName, and startedAt are required",
            ));
        }
    }
    fields.insert("id".to_string(), Value::String(new_id("call")));

    let call: CallRecord = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::bad_request(format!("Invalid call: {e}")))?;
    call.validate().map_err(AppError::BadRequest)?;

    state.calls.insert(call.clone());
    info!(call_id = %call.id, agent_id = %call.agent_id, status = ?call.status, "Recorded call");

    Ok((StatusCode::CREATED, Json(call)))
}

pub async fn get_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<CallRecord>> {
    state
        .calls
        .get(&id)
        .map(Json)
        .ok_or(AppError::NotFound("Call"))
}

/// Deep-merge a partial call record, e.g. to close out an active call
pub async fn update_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> AppResult<Json<CallRecord>> {
    let call = state
        .calls
        .update(&id, &patch)?
        .ok_or(AppError::NotFound("Call"))?;
    info!(call_id = %id, status = ?call.status, "Updated call");
    Ok(Json(call))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param(None, "days", 30u32).unwrap(), 30);
        assert_eq!(parse_param(Some(" 7 "), "days", 30u32).unwrap(), 7);
        assert_eq!(parse_param(Some(""), "days", 30u32).unwrap(), 30);

        let err = parse_param(Some("abc"), "limit", 50usize).unwrap_err();
        assert_eq!(err.to_string(), "Invalid limit 'abc'");
    }
}
