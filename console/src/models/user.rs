use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::SECRET_MASK;

/// Credentials for a LiveKit project
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveKitCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub ws_url: String,
}

impl LiveKitCredentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        ws_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ws_url: ws_url.into(),
        }
    }

    /// All three fields are present and non-empty
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty() && !self.ws_url.is_empty()
    }

    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            api_secret: SECRET_MASK.to_string(),
            ws_url: self.ws_url.clone(),
        }
    }
}

impl std::fmt::Debug for LiveKitCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveKitCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &SECRET_MASK)
            .field("ws_url", &self.ws_url)
            .finish()
    }
}

impl Drop for LiveKitCredentials {
    fn drop(&mut self) {
        self.api_secret.zeroize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    #[default]
    Active,
    PastDue,
    Canceled,
    Trialing,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_calls: u64,
    pub total_minutes: f64,
    pub total_tokens: u64,
    pub calls_this_month: u64,
    pub minutes_this_month: f64,
    pub tokens_this_month: u64,
}

/// Console account. A user may bring their own LiveKit project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub livekit: Option<LiveKitCredentials>,

    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default)]
    pub billing_status: BillingStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub usage: UsageStats,

    #[serde(default)]
    pub agent_ids: Vec<String>,

    pub api_key: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

pub fn default_plan() -> String {
    "free".to_string()
}

impl User {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            company: None,
            role: UserRole::User,
            livekit: None,
            plan: default_plan(),
            billing_status: BillingStatus::Active,
            trial_ends_at: None,
            usage: UsageStats::default(),
            agent_ids: Vec::new(),
            api_key: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Copy safe to return from read endpoints
    pub fn masked(&self) -> Self {
        let mut user = self.clone();
        user.livekit = self.livekit.as_ref().map(LiveKitCredentials::masked);
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_completeness() {
        assert!(LiveKitCredentials::new("key", "secret", "wss://x.livekit.cloud").is_complete());
        assert!(!LiveKitCredentials::new("key", "", "wss://x.livekit.cloud").is_complete());
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = LiveKitCredentials::new("key", "top-secret", "wss://x.livekit.cloud");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("top-secret"));
    }

    #[test]
    fn test_user_masking() {
        let now = Utc::now();
        let user = User {
            id: "user-1".into(),
            email: "a@b.co".into(),
            name: "A".into(),
            company: None,
            role: UserRole::User,
            livekit: Some(LiveKitCredentials::new("k", "s", "wss://h")),
            plan: default_plan(),
            billing_status: BillingStatus::Active,
            trial_ends_at: None,
            usage: UsageStats::default(),
            agent_ids: vec![],
            api_key: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        let masked = user.masked();
        assert_eq!(masked.livekit.as_ref().unwrap().api_secret, SECRET_MASK);
        assert_eq!(masked.livekit.as_ref().unwrap().api_key, "k");
        assert_eq!(user.livekit.as_ref().unwrap().api_secret, "s");
    }
}
