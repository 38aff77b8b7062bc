use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::mask_secret;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelephonyProvider {
    #[default]
    Twilio,
    Telnyx,
    Vonage,
    Plivo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Voice,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneNumberStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

/// A carrier number routed through a SIP trunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub id: String,
    pub number: String,
    pub formatted_number: String,
    pub provider: TelephonyProvider,
    pub country: String,
    pub region: Option<String>,
    pub capabilities: Vec<Capability>,

    pub assigned_agent_id: Option<String>,
    pub sip_trunk_id: Option<String>,

    pub inbound_enabled: bool,

    pub outbound_enabled: bool,
    pub outbound_caller_id: Option<String>,

    pub monthly_cost: f64,
    pub per_minute_cost: f64,

    pub status: PhoneNumberStatus,
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrunkType {
    Inbound,
    Outbound,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrunkStatus {
    #[default]
    Active,
    Inactive,
    Error,
}

/// Connection to a telephony carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipTrunk {
    pub id: String,
    pub name: String,
    pub provider: TelephonyProvider,
    #[serde(rename = "type")]
    pub trunk_type: TrunkType,

    // Twilio Elastic SIP
    pub trunk_sid: Option<String>,
    pub termination_uri: Option<String>,
    pub origination_uri: Option<String>,

    pub username: Option<String>,
    pub password: Option<String>,

    pub livekit_sip_uri: Option<String>,

    pub status: TrunkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SipTrunk {
    pub fn masked(&self) -> Self {
        let mut trunk = self.clone();
        trunk.password = mask_secret(&self.password);
        trunk
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutboundCallStatus {
    Queued,
    Dialing,
    Ringing,
    InProgress,
    Completed,
    Failed,
    Busy,
    NoAnswer,
}

impl OutboundCallStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Busy | Self::NoAnswer)
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Dialing | Self::Ringing | Self::InProgress
        )
    }
}

/// A system-initiated call attempt and its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCall {
    pub id: String,
    pub agent_id: String,
    pub to_number: String,
    pub from_number: String,
    pub caller_id: Option<String>,

    pub status: OutboundCallStatus,

    pub queued_at: DateTime<Utc>,
    pub dialed_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration: Option<u64>,

    pub room_name: Option<String>,
    pub sip_participant_id: Option<String>,

    pub end_reason: Option<String>,
    pub error_message: Option<String>,

    pub cost: Option<f64>,

    pub dtmf_sequence: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SECRET_MASK;

    #[test]
    fn test_outbound_status_wire_names() {
        assert_eq!(
            serde_json::to_value(OutboundCallStatus::InProgress).unwrap(),
            "in-progress"
        );
        assert_eq!(
            serde_json::to_value(OutboundCallStatus::NoAnswer).unwrap(),
            "no-answer"
        );
        assert!(OutboundCallStatus::Busy.is_failure());
        assert!(OutboundCallStatus::Ringing.is_pending());
        assert!(!OutboundCallStatus::Completed.is_pending());
    }

    #[test]
    fn test_trunk_masking() {
        let now = Utc::now();
        let trunk = SipTrunk {
            id: "trunk-1".into(),
            name: "Primary".into(),
            provider: TelephonyProvider::Twilio,
            trunk_type: TrunkType::Both,
            trunk_sid: None,
            termination_uri: None,
            origination_uri: None,
            username: Some("sip-user".into()),
            password: Some("p@ss".into()),
            livekit_sip_uri: None,
            status: TrunkStatus::Active,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(trunk.masked().password.as_deref(), Some(SECRET_MASK));

        let no_password = SipTrunk {
            password: None,
            ..trunk
        };
        assert_eq!(no_password.masked().password, None);
    }
}
