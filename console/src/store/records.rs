use chrono::{DateTime, Utc};

use super::Record;
use crate::models::{Agent, CallRecord, OutboundCall, PhoneNumber, SipTrunk, User};
use crate::utils::{is_valid_email, validate_http_url, validate_livekit_url, validate_phone_number};

impl Record for Agent {
    const KIND: &'static str = "Agent";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.display_name.trim().is_empty() {
            return Err("Name and display name are required".to_string());
        }
        self.conversation.validate()?;

        let endpoints = self
            .webhooks
            .iter()
            .map(|w| w.url.as_str())
            .chain(self.functions.iter().filter_map(|f| f.webhook_url.as_deref()))
            .chain(self.llm.custom_llm_url.as_deref());
        for url in endpoints {
            validate_http_url(url).map_err(|e| format!("Invalid endpoint '{url}': {e}"))?;
        }
        Ok(())
    }
}

impl Record for User {
    const KIND: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        if !is_valid_email(&self.email) {
            return Err("Invalid email format".to_string());
        }
        match &self.livekit {
            Some(creds) if !creds.is_complete() => {
                Err("LiveKit credentials require apiKey, apiSecret and wsUrl".to_string())
            }
            Some(creds) => validate_livekit_url(&creds.ws_url)
                .map(|_| ())
                .map_err(|e| format!("Invalid wsUrl: {e}")),
            None => Ok(()),
        }
    }
}

// Phone numbers carry no modification timestamp
impl Record for PhoneNumber {
    const KIND: &'static str = "Phone number";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        validate_phone_number(&self.number)
    }
}

impl Record for SipTrunk {
    const KIND: &'static str = "SIP trunk";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Record for OutboundCall {
    const KIND: &'static str = "Outbound call";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        validate_phone_number(&self.to_number)?;
        match (self.queued_at, self.ended_at) {
            (queued, Some(ended)) if ended < queued => {
                Err("endedAt must not be before queuedAt".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Record for CallRecord {
    const KIND: &'static str = "Call";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.agent_id.trim().is_empty() || self.room_name.trim().is_empty() {
            return Err("agentId and roomName are required".to_string());
        }
        match self.ended_at {
            Some(ended) if ended < self.started_at => {
                Err("endedAt must not be before startedAt".to_string())
            }
            _ => Ok(()),
        }
    }
}
