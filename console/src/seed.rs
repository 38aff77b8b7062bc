//! Demo data loaded at startup when `SEED_DEMO_DATA` is enabled

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::models::{
    Agent, CallRecord, CallStatus, Capability, EndReason, OutboundCall, OutboundCallStatus,
    PhoneNumber, PhoneNumberStatus, Sentiment, SipTrunk, TelephonyProvider, TrunkStatus,
    TrunkType, User, UserRole,
};
use crate::state::AppState;
use crate::store::new_id;

const CALL_RECORDS: usize = 150;
const OUTBOUND_CALLS: usize = 25;
const HISTORY_DAYS: i64 = 30;

/// Active agent whose name doubles as its id
pub fn demo_agent(id: &str, display_name: &str, now: DateTime<Utc>) -> Agent {
    Agent::new(id, id, display_name, now)
}

pub fn demo_user(id: &str, email: &str, now: DateTime<Utc>) -> User {
    let name = email.split('@').next().unwrap_or(email);
    User::new(id, email, name, now)
}

fn support_agent(now: DateTime<Utc>) -> Agent {
    let mut agent = demo_agent("support-agent", "Customer Support", now);
    agent.description = "Handles customer inquiries and support tickets".to_string();
    agent.prompts.system_prompt = "You are a friendly customer support agent. Help callers \
        resolve account and billing questions, and escalate anything you cannot solve."
        .to_string();
    agent.prompts.first_message =
        "Hi, thanks for calling support! How can I help you today?".to_string();
    agent.conversation.recording_enabled = true;
    agent.tags = Some(vec!["support".to_string()]);
    agent
}

fn sales_agent(now: DateTime<Utc>) -> Agent {
    let mut agent = demo_agent("sales-agent", "Sales Assistant", now);
    agent.description = "Qualifies leads and books product demos".to_string();
    agent.prompts.system_prompt = "You are a sales assistant. Learn what the caller needs, \
        explain how the product fits, and offer to book a demo."
        .to_string();
    agent.prompts.first_message =
        "Hello! I'd love to tell you about what we can do for your team.".to_string();
    agent.voice.voice_id = "echo".to_string();
    agent.llm.temperature = Some(0.8);
    agent.tags = Some(vec!["sales".to_string(), "outbound".to_string()]);
    agent
}

fn admin_user(now: DateTime<Utc>) -> User {
    let mut user = demo_user("admin-1", "admin@agency.com", now);
    user.name = "Agency Admin".to_string();
    user.company = Some("Voice Agency".to_string());
    user.role = UserRole::Admin;
    user.plan = "enterprise".to_string();
    user.last_login_at = Some(now);
    user
}

fn primary_trunk(now: DateTime<Utc>) -> SipTrunk {
    SipTrunk {
        id: "trunk-1".to_string(),
        name: "Primary Twilio Trunk".to_string(),
        provider: TelephonyProvider::Twilio,
        trunk_type: TrunkType::Both,
        trunk_sid: Some("TK00000000000000000000000000000000".to_string()),
        termination_uri: Some("agency.pstn.twilio.com".to_string()),
        origination_uri: Some("sip:agency@sip.livekit.cloud".to_string()),
        username: Some("agency".to_string()),
        password: Some("demo-trunk-password".to_string()),
        livekit_sip_uri: Some("sip:agency.sip.livekit.cloud".to_string()),
        status: TrunkStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

fn phone_number(
    id: &str,
    number: &str,
    formatted: &str,
    region: &str,
    agent_id: &str,
    now: DateTime<Utc>,
) -> PhoneNumber {
    PhoneNumber {
        id: id.to_string(),
        number: number.to_string(),
        formatted_number: formatted.to_string(),
        provider: TelephonyProvider::Twilio,
        country: "US".to_string(),
        region: Some(region.to_string()),
        capabilities: vec![Capability::Voice],
        assigned_agent_id: Some(agent_id.to_string()),
        sip_trunk_id: Some("trunk-1".to_string()),
        inbound_enabled: true,
        outbound_enabled: true,
        outbound_caller_id: None,
        monthly_cost: 1.15,
        per_minute_cost: 0.0085,
        status: PhoneNumberStatus::Active,
        purchased_at: now - Duration::days(HISTORY_DAYS),
        created_at: now - Duration::days(HISTORY_DAYS),
    }
}

fn random_call(rng: &mut impl Rng, agent_ids: &[&str], now: DateTime<Utc>) -> CallRecord {
    let status = *[
        CallStatus::Completed,
        CallStatus::Completed,
        CallStatus::Completed,
        CallStatus::Failed,
        CallStatus::Abandoned,
    ]
    .choose(rng)
    .unwrap_or(&CallStatus::Completed);
    let sentiment = [
        Sentiment::Positive,
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
    ]
    .choose(rng)
    .copied();
    let agent_id = agent_ids.choose(rng).copied().unwrap_or("support-agent");

    let duration: u64 = rng.gen_range(30..630);
    let started_at = now - Duration::seconds(rng.gen_range(0..HISTORY_DAYS * 24 * 60 * 60));

    CallRecord {
        id: new_id("call"),
        agent_id: agent_id.to_string(),
        user_id: "admin-1".to_string(),
        room_name: format!("{agent_id}-{}", started_at.timestamp_millis()),
        started_at,
        ended_at: Some(started_at + Duration::seconds(duration as i64)),
        duration,
        status,
        end_reason: Some(if status == CallStatus::Completed {
            EndReason::UserHangup
        } else {
            EndReason::Error
        }),
        tokens_used: rng.gen_range(500..5500),
        cost: rng.gen_range(0.05..0.55),
        latency_avg: rng.gen_range(100.0..300.0),
        latency_p95: rng.gen_range(200.0..600.0),
        transcript: None,
        summary: None,
        sentiment,
        phone_number: None,
        caller_number: Some(format!("+1555{:07}", rng.gen_range(0..10_000_000))),
    }
}

fn random_outbound(rng: &mut impl Rng, now: DateTime<Utc>) -> OutboundCall {
    let status = *[
        OutboundCallStatus::Completed,
        OutboundCallStatus::Completed,
        OutboundCallStatus::Completed,
        OutboundCallStatus::NoAnswer,
        OutboundCallStatus::Busy,
        OutboundCallStatus::Failed,
    ]
    .choose(rng)
    .unwrap_or(&OutboundCallStatus::Completed);

    let queued_at = now - Duration::seconds(rng.gen_range(0..HISTORY_DAYS * 24 * 60 * 60));
    let dialed_at = queued_at + Duration::seconds(2);

    let mut call = OutboundCall {
        id: new_id("oc"),
        agent_id: "sales-agent".to_string(),
        to_number: format!("+1555{:07}", rng.gen_range(0..10_000_000)),
        from_number: "+15559876543".to_string(),
        caller_id: Some("TechCorp Sales".to_string()),
        status,
        queued_at,
        dialed_at: Some(dialed_at),
        answered_at: None,
        ended_at: None,
        duration: None,
        room_name: None,
        sip_participant_id: None,
        end_reason: None,
        error_message: None,
        cost: None,
        dtmf_sequence: None,
        metadata: None,
    };

    if status == OutboundCallStatus::Completed {
        let duration: u64 = rng.gen_range(30..330);
        let answered_at = dialed_at + Duration::seconds(rng.gen_range(3..20));
        call.answered_at = Some(answered_at);
        call.ended_at = Some(answered_at + Duration::seconds(duration as i64));
        call.duration = Some(duration);
        call.room_name = Some(format!("sales-agent-{}", queued_at.timestamp_millis()));
        call.end_reason = Some("completed".to_string());
        call.cost = Some(duration as f64 * 0.0085 / 60.0);
    } else {
        call.ended_at = Some(dialed_at + Duration::seconds(30));
        call.end_reason = Some(
            match status {
                OutboundCallStatus::Busy => "busy",
                OutboundCallStatus::NoAnswer => "no-answer",
                _ => "failed",
            }
            .to_string(),
        );
        if status == OutboundCallStatus::Failed {
            call.error_message = Some("Carrier rejected the call".to_string());
        }
    }
    call
}

/// Populate every store with a small, self-consistent demo dataset
pub fn seed_demo_data(state: &AppState, rng: &mut impl Rng, now: DateTime<Utc>) {
    let mut support = support_agent(now);
    let mut sales = sales_agent(now);

    let mut pn1 = phone_number(
        "pn-1",
        "+15551234567",
        "+1 (555) 123-4567",
        "CA",
        &support.id,
        now,
    );
    pn1.capabilities.push(Capability::Sms);

    let mut pn2 = phone_number(
        "pn-2",
        "+15559876543",
        "+1 (555) 987-6543",
        "NY",
        &sales.id,
        now,
    );
    pn2.inbound_enabled = false;
    pn2.outbound_caller_id = Some("TechCorp Sales".to_string());

    support.phone_number_ids.push(pn1.id.clone());
    sales.phone_number_ids.push(pn2.id.clone());

    let agent_ids = [support.id.clone(), sales.id.clone()];
    state.agents.insert(support);
    state.agents.insert(sales);
    state.users.insert(admin_user(now));
    state.sip_trunks.insert(primary_trunk(now));
    state.phone_numbers.insert(pn1);
    state.phone_numbers.insert(pn2);

    let agent_refs: Vec<&str> = agent_ids.iter().map(String::as_str).collect();
    for _ in 0..CALL_RECORDS {
        state.calls.insert(random_call(rng, &agent_refs, now));
    }
    for _ in 0..OUTBOUND_CALLS {
        state.outbound_calls.insert(random_outbound(rng, now));
    }

    info!(
        agents = state.agents.len(),
        users = state.users.len(),
        phone_numbers = state.phone_numbers.len(),
        calls = state.calls.len(),
        outbound_calls = state.outbound_calls.len(),
        "Seeded demo data"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::store::Record;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_seed_populates_consistent_data() {
        let state = AppState::new(ServerConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        seed_demo_data(&state, &mut rng, Utc::now());

        assert_eq!(state.agents.len(), 2);
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.sip_trunks.len(), 1);
        assert_eq!(state.phone_numbers.len(), 2);
        assert_eq!(state.calls.len(), CALL_RECORDS);
        assert_eq!(state.outbound_calls.len(), OUTBOUND_CALLS);

        let sales = state.agents.get("sales-agent").unwrap();
        assert_eq!(sales.voice.voice_id, "echo");
        assert_eq!(sales.phone_number_ids, vec!["pn-2"]);

        for agent in state.agents.list() {
            assert!(agent.validate().is_ok());
        }
        for call in state.calls.list() {
            assert!((30..630).contains(&call.duration));
            assert_eq!(call.user_id, "admin-1");
        }
        for call in state.outbound_calls.list() {
            if call.status == OutboundCallStatus::Completed {
                let duration = call.duration.unwrap();
                assert!((call.cost.unwrap() - duration as f64 * 0.0085 / 60.0).abs() < 1e-9);
            } else {
                assert!(call.duration.is_none());
            }
        }
    }
}
