use crate::auth::{Auth, match_api_secret_id};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract the bearer token from the `Authorization` header
fn extract_token(request: &Request) -> Result<&str, AuthError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?;

    let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Authentication middleware that validates bearer tokens against the
/// configured API secrets
///
/// When authentication is disabled an empty [`Auth`] is inserted so handlers
/// that read the context still work. On success the matching secret id is
/// inserted; otherwise the request is rejected with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.config.auth_required {
        request.extensions_mut().insert(Auth::empty());
        return Ok(next.run(request).await);
    }

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    if !state.config.has_api_secret_auth() {
        return Err(AuthError::ConfigError(
            "Authentication required but no API secrets configured".to_string(),
        ));
    }

    let token = match extract_token(&request) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(method = %method, path = %path, error = %e, "Rejected request without valid credentials");
            return Err(e);
        }
    };

    let Some(secret_id) = match_api_secret_id(token, &state.config.auth_api_secrets) else {
        tracing::warn!(
            method = %method,
            path = %path,
            "API secret authentication failed: token mismatch"
        );
        return Err(AuthError::Unauthorized("Invalid API secret".to_string()));
    };

    tracing::debug!(
        method = %method,
        path = %path,
        auth_id = %secret_id,
        "API secret authentication successful"
    );
    let auth = Auth::new(secret_id);
    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}
