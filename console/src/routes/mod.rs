//! Router assembly
//!
//! Everything is served under `/api`. Only `/api/health` skips authentication.

pub mod api;

use axum::{Router, middleware};
use std::sync::Arc;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// URL prefix of every route
pub const API_PREFIX: &str = "/api";

/// Apply bearer authentication to a router
pub fn protect(router: Router<Arc<AppState>>, state: &Arc<AppState>) -> Router<Arc<AppState>> {
    router.layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Full application without rate limiting or transport layers
///
/// The binary adds CORS, security headers and rate limiting around the same
/// pieces; tests drive this router directly.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api = api::create_public_router()
        .merge(protect(api::create_api_router(), &state))
        .merge(protect(api::create_token_router(), &state));

    Router::new().nest(API_PREFIX, api).with_state(state)
}
