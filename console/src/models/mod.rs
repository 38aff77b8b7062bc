//! Domain records exchanged over the API
//!
//! Every record serializes in camelCase so the browser console can consume it
//! directly. Timestamps are RFC 3339 in UTC.

pub mod agent;
pub mod analytics;
pub mod settings;
pub mod telephony;
pub mod user;

pub use agent::{
    Agent, AgentFunction, AgentPrompts, AgentStatus, ConversationConfig, LlmConfig, LlmProvider,
    McpServer, TranscriberConfig, TranscriberProvider, VoiceConfig, VoiceProvider, WebhookConfig,
    WebhookEvent,
};
pub use analytics::{
    AgentAnalytics, AnalyticsSummary, CallRecord, CallStatus, DailyStats, EndReason,
    OutboundCallStats, Period, Sentiment, SentimentBreakdown, Speaker, TranscriptEntry,
};
pub use settings::PlatformSettings;
pub use telephony::{
    Capability, OutboundCall, OutboundCallStatus, PhoneNumber, PhoneNumberStatus, SipTrunk,
    TelephonyProvider, TrunkStatus, TrunkType,
};
pub use user::{BillingStatus, LiveKitCredentials, UsageStats, User, UserRole};

/// Placeholder returned in place of secrets on read paths
pub const SECRET_MASK: &str = "••••••••";

/// Replace a present secret with the mask, keep absent ones absent
pub fn mask_secret(secret: &Option<String>) -> Option<String> {
    secret.as_ref().map(|_| SECRET_MASK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(&None), None);
        assert_eq!(
            mask_secret(&Some("hunter2".to_string())).as_deref(),
            Some(SECRET_MASK)
        );
    }
}
