//! Environment variable loading

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{AuthApiSecret, ConfigError, ServerConfig, TlsConfig, parse_auth_api_secrets_json};

/// Read a variable, treating blank values as unset
pub(crate) fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                ConfigError::InvalidValue(format!("{key} has invalid value '{raw}': {e}"))
            })
        })
        .transpose()
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    env_var(key).map(|raw| parse_bool(key, &raw)).transpose()
}

/// Build a configuration from environment variables on top of the defaults
///
/// `.env` values are already in the process environment at this point; main
/// loads them with `dotenvy` before any configuration is read.
pub(crate) fn load() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = env_parse::<u16>("PORT")? {
        config.port = port;
    }

    if env_bool("TLS_ENABLED")?.unwrap_or(false) {
        let cert_path = env_var("TLS_CERT_PATH").ok_or_else(|| {
            ConfigError::Validation("TLS_ENABLED is true but TLS_CERT_PATH is not set".into())
        })?;
        let key_path = env_var("TLS_KEY_PATH").ok_or_else(|| {
            ConfigError::Validation("TLS_ENABLED is true but TLS_KEY_PATH is not set".into())
        })?;
        config.tls = Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        });
    }

    config.livekit_url = env_var("LIVEKIT_URL");
    config.livekit_api_key = env_var("LIVEKIT_API_KEY");
    config.livekit_api_secret = env_var("LIVEKIT_API_SECRET");

    config.auth_api_secrets = load_api_secrets()?;
    if let Some(required) = env_bool("AUTH_REQUIRED")? {
        config.auth_required = required;
    }

    config.cors_allowed_origins = env_var("CORS_ALLOWED_ORIGINS");
    if let Some(rps) = env_parse("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = env_parse("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }
    if let Some(per_minute) = env_parse("TOKEN_RATE_LIMIT_PER_MINUTE")? {
        config.token_rate_limit_per_minute = per_minute;
    }

    if let Some(seed) = env_bool("SEED_DEMO_DATA")? {
        config.seed_demo_data = seed;
    }

    Ok(config)
}

/// `AUTH_API_SECRETS_JSON` wins over the single `AUTH_API_SECRET` form
fn load_api_secrets() -> Result<Vec<AuthApiSecret>, ConfigError> {
    if let Some(json) = env_var("AUTH_API_SECRETS_JSON") {
        return parse_auth_api_secrets_json(&json);
    }

    Ok(env_var("AUTH_API_SECRET")
        .map(|secret| {
            vec![AuthApiSecret {
                id: env_var("AUTH_API_SECRET_ID").unwrap_or_else(|| "default".to_string()),
                secret,
            }]
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cleanup() {
        unsafe {
            for key in [
                "HOST",
                "PORT",
                "TLS_ENABLED",
                "TLS_CERT_PATH",
                "TLS_KEY_PATH",
                "LIVEKIT_URL",
                "LIVEKIT_API_KEY",
                "LIVEKIT_API_SECRET",
                "AUTH_REQUIRED",
                "AUTH_API_SECRETS_JSON",
                "AUTH_API_SECRET",
                "AUTH_API_SECRET_ID",
                "RATE_LIMIT_REQUESTS_PER_SECOND",
                "TOKEN_RATE_LIMIT_PER_MINUTE",
                "SEED_DEMO_DATA",
            ] {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        cleanup();
        let config = load().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert!(config.tls.is_none());
        assert!(config.livekit_url.is_none());
        assert_eq!(config.rate_limit_requests_per_second, 60);
        assert_eq!(config.token_rate_limit_per_minute, 30);
        assert!(config.seed_demo_data);
        assert!(!config.auth_required);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        cleanup();
        unsafe {
            env::set_var("PORT", "8088");
            env::set_var("LIVEKIT_URL", "wss://env.livekit.cloud");
            env::set_var("LIVEKIT_API_KEY", "APIenv");
            env::set_var("SEED_DEMO_DATA", "false");
            env::set_var("AUTH_API_SECRET", "s3cret");
        }

        let config = load().unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.livekit_url.as_deref(), Some("wss://env.livekit.cloud"));
        assert_eq!(config.livekit_api_key.as_deref(), Some("APIenv"));
        assert!(!config.seed_demo_data);
        assert_eq!(config.auth_api_secrets.len(), 1);
        assert_eq!(config.auth_api_secrets[0].id, "default");

        cleanup();
    }

    #[test]
    #[serial]
    fn test_secrets_json_takes_precedence() {
        cleanup();
        unsafe {
            env::set_var(
                "AUTH_API_SECRETS_JSON",
                r#"[{"id":"a","secret":"one"},{"id":"b","secret":"two"}]"#,
            );
            env::set_var("AUTH_API_SECRET", "ignored");
        }

        let config = load().unwrap();
        let ids: Vec<_> = config.auth_api_secrets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        cleanup();
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        cleanup();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }
        assert!(matches!(load(), Err(ConfigError::InvalidValue(_))));

        cleanup();
        unsafe {
            env::set_var("TLS_ENABLED", "true");
            env::set_var("TLS_CERT_PATH", "/tmp/cert.pem");
        }
        let err = load().unwrap_err();
        assert!(err.to_string().contains("TLS_KEY_PATH"));

        cleanup();
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "Yes").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
