//! Configuration module for the agent console
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use agent_console::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config = ServerConfig::from_file(&PathBuf::from("console.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::LiveKitCredentials;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Read(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// API secret authentication entry with a client identifier
#[derive(Clone, PartialEq, Eq)]
pub struct AuthApiSecret {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for AuthApiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApiSecret")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Server configuration
///
/// Contains everything needed to run the console:
/// - Server settings (host, port, TLS)
/// - Environment-level LiveKit project, the last fallback for token issuance
/// - Authentication settings
/// - Security settings (CORS, rate limiting)
/// - Startup behaviour (demo data)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // LiveKit settings
    pub livekit_url: Option<String>,
    pub livekit_api_key: Option<String>,
    pub livekit_api_secret: Option<String>,

    // Authentication configuration
    pub auth_api_secrets: Vec<AuthApiSecret>,
    pub auth_required: bool,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
    /// Token issuance requests per minute per IP address
    /// Default: 30
    pub token_rate_limit_per_minute: u32,

    /// Populate the stores with example records at startup
    /// Default: true
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            livekit_url: None,
            livekit_api_key: None,
            livekit_api_secret: None,
            auth_api_secrets: Vec::new(),
            auth_required: false,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
            token_rate_limit_per_minute: 30,
            seed_demo_data: true,
        }
    }
}

/// Zeroize secret fields when the configuration is dropped
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.livekit_api_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.livekit_api_secret {
            secret.zeroize();
        }
        for secret in &mut self.auth_api_secrets {
            secret.secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// Call `dotenvy::dotenv()` first if `.env` values should be visible.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if the YAML file cannot be read or is malformed, an
    /// environment variable has an invalid format, or validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        // .env is loaded in main.rs before this runs
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Returns true if at least one API secret entry is configured
    pub fn has_api_secret_auth(&self) -> bool {
        !self.auth_api_secrets.is_empty()
    }

    /// Find the API secret identifier that matches a bearer token
    pub fn find_api_secret_id(&self, token: &str) -> Option<&str> {
        crate::auth::match_api_secret_id(token, &self.auth_api_secrets)
    }

    /// Environment-level LiveKit credentials
    ///
    /// Key and secret are required; the URL falls back to the placeholder project URL.
    pub fn livekit_credentials(&self) -> Option<LiveKitCredentials> {
        let (Some(key), Some(secret)) = (&self.livekit_api_key, &self.livekit_api_secret) else {
            return None;
        };
        let url = self
            .livekit_url
            .as_deref()
            .unwrap_or(crate::livekit::DEFAULT_WS_URL);
        Some(LiveKitCredentials::new(key, secret, url))
    }

    /// Names of the LiveKit environment variables that are not set
    pub fn missing_livekit_env(&self) -> Vec<&'static str> {
        [
            ("LIVEKIT_API_KEY", self.livekit_api_key.is_none()),
            ("LIVEKIT_API_SECRET", self.livekit_api_secret.is_none()),
            ("LIVEKIT_URL", self.livekit_url.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

pub(crate) fn parse_auth_api_secrets_json(json_str: &str) -> Result<Vec<AuthApiSecret>, ConfigError> {
    #[derive(serde::Deserialize)]
    struct AuthApiSecretJson {
        id: String,
        secret: String,
    }

    let secrets: Vec<AuthApiSecretJson> = serde_json::from_str(json_str).map_err(|e| {
        ConfigError::InvalidValue(format!("Invalid AUTH_API_SECRETS_JSON format: {e}"))
    })?;

    Ok(secrets
        .into_iter()
        .map(|entry| AuthApiSecret {
            id: entry.id,
            secret: entry.secret,
        })
        .collect())
}
