//! LiveKit access token issuance
//!
//! A browser joins an agent's room with a short-lived JWT signed by the API
//! secret of whichever LiveKit project applies to the call. The project is
//! picked from a fixed chain, first match wins:
//!
//! 1. complete credentials supplied with the request
//! 2. the requesting user's credentials
//! 3. the agent owner's credentials
//! 4. platform settings
//! 5. server environment (`LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET`, `LIVEKIT_URL`)

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use livekit_api::access_token::{AccessToken, AccessTokenError, VideoGrants};
use serde::Serialize;
use thiserror::Error;

use crate::models::{Agent, LiveKitCredentials};

/// Used when no credential source provides a URL
pub const DEFAULT_WS_URL: &str = "wss://your-project.livekit.cloud";

pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

pub const TEST_TOKEN_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("LiveKit API credentials not configured")]
    MissingCredentials,

    #[error("{0}")]
    Signing(#[from] AccessTokenError),
}

/// Where the credentials used for a token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Request,
    User,
    AgentOwner,
    Platform,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Request => "request",
            CredentialSource::User => "user",
            CredentialSource::AgentOwner => "agent_owner",
            CredentialSource::Platform => "platform",
            CredentialSource::Environment => "environment",
        })
    }
}

/// Candidate credentials in priority order
///
/// Incomplete entries are skipped.
#[derive(Debug, Default)]
pub struct CredentialChain {
    pub request: Option<LiveKitCredentials>,
    pub user: Option<LiveKitCredentials>,
    pub agent_owner: Option<LiveKitCredentials>,
    pub platform: Option<LiveKitCredentials>,
    pub environment: Option<LiveKitCredentials>,
}

impl CredentialChain {
    pub fn resolve(self) -> Option<(LiveKitCredentials, CredentialSource)> {
        [
            (self.request, CredentialSource::Request),
            (self.user, CredentialSource::User),
            (self.agent_owner, CredentialSource::AgentOwner),
            (self.platform, CredentialSource::Platform),
            (self.environment, CredentialSource::Environment),
        ]
        .into_iter()
        .find_map(|(creds, source)| {
            creds
                .filter(LiveKitCredentials::is_complete)
                .map(|creds| (creds, source))
        })
    }
}

/// Sign a room-join token for one participant
pub fn mint_token(
    credentials: &LiveKitCredentials,
    room_name: &str,
    identity: &str,
    name: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    if credentials.api_key.is_empty() || credentials.api_secret.is_empty() {
        return Err(TokenError::MissingCredentials);
    }

    let grants = VideoGrants {
        room_join: true,
        room: room_name.to_string(),
        can_publish: true,
        can_subscribe: true,
        can_publish_data: true,
        ..Default::default()
    };

    let token = AccessToken::with_api_key(&credentials.api_key, &credentials.api_secret)
        .with_identity(identity)
        .with_name(name)
        .with_ttl(ttl)
        .with_grants(grants)
        .to_jwt()?;
    Ok(token)
}

/// Everything a browser needs to join an agent's room
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub ws_url: String,
    pub room_name: String,
    pub participant_identity: String,
    pub agent_name: String,
}

/// Issue a token for a fresh room dedicated to `agent`
///
/// Room and identity are derived from `now` in epoch milliseconds.
pub fn issue_agent_token(
    agent: &Agent,
    participant_name: Option<&str>,
    chain: CredentialChain,
    now: DateTime<Utc>,
) -> Result<(IssuedToken, CredentialSource), TokenError> {
    let (credentials, source) = chain.resolve().ok_or(TokenError::MissingCredentials)?;

    let millis = now.timestamp_millis();
    let room_name = format!("{}-{millis}", agent.id);
    let participant_identity = format!("user-{millis}");
    let name = participant_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("User");

    let token = mint_token(&credentials, &room_name, &participant_identity, name, TOKEN_TTL)?;

    let ws_url = if credentials.ws_url.is_empty() {
        DEFAULT_WS_URL.to_string()
    } else {
        credentials.ws_url.clone()
    };

    Ok((
        IssuedToken {
            token,
            ws_url,
            room_name,
            participant_identity,
            agent_name: agent.name.clone(),
        },
        source,
    ))
}

/// Sign a short-lived throwaway token to prove a credential set is usable
pub fn test_credentials(credentials: &LiveKitCredentials) -> Result<String, TokenError> {
    mint_token(
        credentials,
        "test-room",
        "test-connection",
        "Connection Test",
        TEST_TOKEN_TTL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(key: &str) -> LiveKitCredentials {
        LiveKitCredentials::new(key, "a-sufficiently-long-test-secret", "wss://t.livekit.cloud")
    }

    #[test]
    fn test_chain_priority() {
        let chain = CredentialChain {
            request: None,
            user: Some(creds("user")),
            agent_owner: Some(creds("owner")),
            platform: Some(creds("platform")),
            environment: Some(creds("env")),
        };
        let (resolved, source) = chain.resolve().unwrap();
        assert_eq!(resolved.api_key, "user");
        assert_eq!(source, CredentialSource::User);
    }

    #[test]
    fn test_chain_skips_incomplete() {
        let chain = CredentialChain {
            request: Some(LiveKitCredentials::new("req", "", "wss://x")),
            platform: Some(creds("platform")),
            ..Default::default()
        };
        let (resolved, source) = chain.resolve().unwrap();
        assert_eq!(resolved.api_key, "platform");
        assert_eq!(source, CredentialSource::Platform);

        assert!(CredentialChain::default().resolve().is_none());
    }

    #[test]
    fn test_mint_token_produces_jwt() {
        let token = mint_token(&creds("key"), "room-1", "user-1", "Tester", TOKEN_TTL).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_missing_credentials() {
        let incomplete = LiveKitCredentials::new("", "", "");
        assert!(matches!(
            mint_token(&incomplete, "r", "i", "n", TOKEN_TTL),
            Err(TokenError::MissingCredentials)
        ));
        assert!(test_credentials(&creds("key")).is_ok());
    }
}
