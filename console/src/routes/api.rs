use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    agents, analytics, api, outbound_calls, phone_numbers, settings, sip_trunks, token, users,
};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Note: Authentication middleware is applied by the caller once state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Agents
        .route(
            "/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/agents/{id}",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/{id}/livekit",
            put(users::set_user_livekit).delete(users::clear_user_livekit),
        )
        .route(
            "/users/{id}/agents",
            get(users::list_user_agents)
                .post(users::assign_user_agent)
                .delete(users::remove_user_agent),
        )
        // Telephony
        .route(
            "/phone-numbers",
            get(phone_numbers::list_phone_numbers).post(phone_numbers::create_phone_number),
        )
        .route(
            "/phone-numbers/{id}",
            get(phone_numbers::get_phone_number)
                .put(phone_numbers::update_phone_number)
                .delete(phone_numbers::delete_phone_number),
        )
        .route(
            "/sip-trunks",
            get(sip_trunks::list_sip_trunks).post(sip_trunks::create_sip_trunk),
        )
        .route(
            "/sip-trunks/{id}",
            get(sip_trunks::get_sip_trunk)
                .put(sip_trunks::update_sip_trunk)
                .delete(sip_trunks::delete_sip_trunk),
        )
        .route(
            "/outbound-calls",
            get(outbound_calls::list_outbound_calls).post(outbound_calls::create_outbound_call),
        )
        .route(
            "/outbound-calls/{id}",
            get(outbound_calls::get_outbound_call).put(outbound_calls::update_outbound_call),
        )
        // Platform settings
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/settings/livekit",
            put(settings::set_platform_livekit).delete(settings::clear_platform_livekit),
        )
        .route("/settings/livekit/test", post(settings::test_livekit))
        // Analytics
        .route("/analytics", get(analytics::get_analytics))
        .route(
            "/analytics/calls",
            get(analytics::list_calls).post(analytics::create_call),
        )
        .route(
            "/analytics/calls/{id}",
            get(analytics::get_call).put(analytics::update_call),
        )
        .layer(TraceLayer::new_for_http())
}

/// Token issuance, kept separate so it can carry a stricter rate limit
pub fn create_token_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/token", post(token::generate_token))
        .layer(TraceLayer::new_for_http())
}

/// Unauthenticated routes
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(api::health_check))
}
