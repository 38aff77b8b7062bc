//! Merging YAML overrides onto the environment configuration

use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{AuthApiSecret, ConfigError, ServerConfig, TlsConfig, env};

/// Load the environment configuration and apply YAML values on top
///
/// Priority: YAML > ENV vars > .env values > defaults
pub(crate) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let mut config = env::load()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            match tls.enabled {
                Some(false) => config.tls = None,
                Some(true) => {
                    let (Some(cert_path), Some(key_path)) = (tls.cert_path, tls.key_path) else {
                        return Err(ConfigError::Validation(
                            "server.tls.enabled requires cert_path and key_path".to_string(),
                        ));
                    };
                    config.tls = Some(TlsConfig {
                        cert_path: PathBuf::from(cert_path),
                        key_path: PathBuf::from(key_path),
                    });
                }
                None => {}
            }
        }
    }

    if let Some(livekit) = yaml.livekit {
        if livekit.url.is_some() {
            config.livekit_url = livekit.url;
        }
        if livekit.api_key.is_some() {
            config.livekit_api_key = livekit.api_key;
        }
        if livekit.api_secret.is_some() {
            config.livekit_api_secret = livekit.api_secret;
        }
    }

    if let Some(auth) = yaml.auth {
        if let Some(required) = auth.required {
            config.auth_required = required;
        }
        if !auth.api_secrets.is_empty() {
            config.auth_api_secrets = auth
                .api_secrets
                .into_iter()
                .map(|entry| AuthApiSecret {
                    id: entry.id,
                    secret: entry.secret,
                })
                .collect();
        } else if let Some(secret) = auth.api_secret {
            config.auth_api_secrets = vec![AuthApiSecret {
                id: "default".to_string(),
                secret,
            }];
        }
    }

    if let Some(security) = yaml.security {
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
        if let Some(per_minute) = security.token_rate_limit_per_minute {
            config.token_rate_limit_per_minute = per_minute;
        }
    }

    if let Some(seed) = yaml.console.and_then(|c| c.seed_demo_data) {
        config.seed_demo_data = seed;
    }

    Ok(config)
}
