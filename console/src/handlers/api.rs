use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentCheck {
    pub status: HealthStatus,
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub status: HealthStatus,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub environment: EnvironmentCheck,
    pub database: DatabaseCheck,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub checks: HealthChecks,
}

/// Health check endpoint
///
/// Degraded (503) while any LiveKit environment variable is missing.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let missing = state.config.missing_livekit_env();
    let environment = if missing.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status: environment,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            environment: EnvironmentCheck {
                status: environment,
                missing,
            },
            database: DatabaseCheck {
                status: HealthStatus::Healthy,
                kind: "in-memory",
            },
        },
    };

    let status = match environment {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(response))
}
