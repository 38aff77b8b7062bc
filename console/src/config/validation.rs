//! Checks applied to the final merged configuration

use std::collections::HashSet;

use super::{AuthApiSecret, ConfigError, ServerConfig};
use crate::utils::validate_livekit_url;

pub(crate) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_auth_api_secrets(&config.auth_api_secrets)?;
    validate_auth_required(config.auth_required, &config.auth_api_secrets)?;
    validate_tls(config)?;
    validate_livekit(config)?;
    validate_rate_limits(config)?;
    Ok(())
}

pub(crate) fn validate_auth_api_secrets(secrets: &[AuthApiSecret]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in secrets {
        if entry.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "API secret entries require a non-empty id".to_string(),
            ));
        }
        if entry.secret.is_empty() {
            return Err(ConfigError::Validation(format!(
                "API secret '{}' is empty",
                entry.id
            )));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate API secret id '{}'",
                entry.id
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_auth_required(
    auth_required: bool,
    secrets: &[AuthApiSecret],
) -> Result<(), ConfigError> {
    if auth_required && secrets.is_empty() {
        return Err(ConfigError::Validation(
            "AUTH_REQUIRED is true but no API secrets are configured \
             (set AUTH_API_SECRETS_JSON or AUTH_API_SECRET)"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_tls(config: &ServerConfig) -> Result<(), ConfigError> {
    let Some(tls) = &config.tls else {
        return Ok(());
    };
    for (label, path) in [("certificate", &tls.cert_path), ("private key", &tls.key_path)] {
        if !path.exists() {
            return Err(ConfigError::Validation(format!(
                "TLS {label} not found at {}",
                path.display()
            )));
        }
    }
    Ok(())
}

fn validate_livekit(config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(url) = &config.livekit_url {
        validate_livekit_url(url)
            .map_err(|e| ConfigError::Validation(format!("LIVEKIT_URL is invalid: {e}")))?;
    }
    Ok(())
}

fn validate_rate_limits(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.rate_limit_requests_per_second == 0 || config.rate_limit_burst_size == 0 {
        return Err(ConfigError::Validation(
            "Rate limit and burst size must be greater than zero".to_string(),
        ));
    }
    if config.token_rate_limit_per_minute == 0 {
        return Err(ConfigError::Validation(
            "TOKEN_RATE_LIMIT_PER_MINUTE must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
