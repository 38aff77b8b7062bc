use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::livekit::CredentialChain;
use crate::models::{
    Agent, CallRecord, LiveKitCredentials, OutboundCall, PhoneNumber, SipTrunk, User,
};
use crate::store::{MemoryStore, Repository, SettingsStore};

/// Shared application state
///
/// Holds the configuration and every entity collection. Collections are
/// trait objects so a persistent backend can be swapped in at construction.
pub struct AppState {
    pub config: ServerConfig,
    pub agents: Arc<dyn Repository<Agent>>,
    pub users: Arc<dyn Repository<User>>,
    pub phone_numbers: Arc<dyn Repository<PhoneNumber>>,
    pub sip_trunks: Arc<dyn Repository<SipTrunk>>,
    pub outbound_calls: Arc<dyn Repository<OutboundCall>>,
    pub calls: Arc<dyn Repository<CallRecord>>,
    pub settings: SettingsStore,
}

impl AppState {
    /// Create state with empty in-memory stores
    pub fn new(config: ServerConfig) -> Arc<Self> {
        info!(seed_demo_data = config.seed_demo_data, "Initializing in-memory stores");
        Arc::new(Self {
            config,
            agents: Arc::new(MemoryStore::new()),
            users: Arc::new(MemoryStore::new()),
            phone_numbers: Arc::new(MemoryStore::new()),
            sip_trunks: Arc::new(MemoryStore::new()),
            outbound_calls: Arc::new(MemoryStore::new()),
            calls: Arc::new(MemoryStore::new()),
            settings: SettingsStore::new(),
        })
    }

    pub fn agent(&self, id: &str) -> AppResult<Agent> {
        self.agents.get(id).ok_or(AppError::NotFound("Agent"))
    }

    pub fn user(&self, id: &str) -> AppResult<User> {
        self.users.get(id).ok_or(AppError::NotFound("User"))
    }

    /// Agents whose `ownerId` is the given user
    pub fn agents_owned_by(&self, user_id: &str) -> AppResult<Vec<Agent>> {
        self.user(user_id)?;
        Ok(self
            .agents
            .list()
            .into_iter()
            .filter(|a| a.owner_id.as_deref() == Some(user_id))
            .collect())
    }

    /// Record ownership on both sides: `User.agentIds` and `Agent.ownerId`
    pub fn assign_agent_to_user(&self, user_id: &str, agent_id: &str) -> AppResult<User> {
        self.agent(agent_id)?;
        let user = self
            .users
            .modify(user_id, &mut |user| {
                if !user.agent_ids.iter().any(|id| id == agent_id) {
                    user.agent_ids.push(agent_id.to_string());
                }
            })
            .ok_or(AppError::NotFound("User"))?;

        // A previous owner keeps a stale agentIds entry; no cascade by convention
        self.agents.modify(agent_id, &mut |agent| {
            agent.owner_id = Some(user_id.to_string());
        });

        info!(user_id = %user_id, agent_id = %agent_id, "Assigned agent to user");
        Ok(user)
    }

    pub fn remove_agent_from_user(&self, user_id: &str, agent_id: &str) -> AppResult<User> {
        let user = self
            .users
            .modify(user_id, &mut |user| user.agent_ids.retain(|id| id != agent_id))
            .ok_or(AppError::NotFound("User"))?;

        self.agents.modify(agent_id, &mut |agent| {
            if agent.owner_id.as_deref() == Some(user_id) {
                agent.owner_id = None;
            }
        });

        info!(user_id = %user_id, agent_id = %agent_id, "Removed agent from user");
        Ok(user)
    }

    /// Mirror a phone number's agent assignment into `Agent.phoneNumberIds`
    ///
    /// Detaches the number from `previous` and attaches it to `current`.
    pub fn sync_phone_assignment(
        &self,
        phone_number_id: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) {
        if previous == current {
            return;
        }
        if let Some(previous) = previous {
            self.agents.modify(previous, &mut |agent| {
                agent.phone_number_ids.retain(|id| id != phone_number_id);
            });
        }
        if let Some(current) = current {
            let attached = self.agents.modify(current, &mut |agent| {
                if !agent.phone_number_ids.iter().any(|id| id == phone_number_id) {
                    agent.phone_number_ids.push(phone_number_id.to_string());
                }
            });
            if attached.is_none() {
                debug!(agent_id = %current, phone_number_id = %phone_number_id, "Assigned agent does not exist");
            }
        }
    }

    /// Collect the credential candidates for a token issued on behalf of `agent`
    ///
    /// A caller without credentials of their own still falls through to the
    /// agent owner's.
    pub fn credential_chain(
        &self,
        agent: &Agent,
        request: Option<LiveKitCredentials>,
        user_id: Option<&str>,
    ) -> CredentialChain {
        let user_credentials = |id: &str| self.users.get(id).and_then(|u| u.livekit.clone());

        CredentialChain {
            request,
            user: user_id.and_then(user_credentials),
            agent_owner: agent.owner_id.as_deref().and_then(user_credentials),
            platform: self.settings.livekit(),
            environment: self.config.livekit_credentials(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{demo_agent, demo_user};
    use chrono::Utc;

    fn state() -> Arc<AppState> {
        let mut config = ServerConfig::default();
        config.seed_demo_data = false;
        AppState::new(config)
    }

    #[test]
    fn test_assign_and_remove_agent() {
        let state = state();
        let now = Utc::now();
        state.agents.insert(demo_agent("support-agent", "Customer Support", now));
        state.users.insert(demo_user("user-1", "a@example.com", now));

        let user = state.assign_agent_to_user("user-1", "support-agent").unwrap();
        assert_eq!(user.agent_ids, vec!["support-agent"]);
        assert_eq!(
            state.agent("support-agent").unwrap().owner_id.as_deref(),
            Some("user-1")
        );
        assert_eq!(state.agents_owned_by("user-1").unwrap().len(), 1);

        // idempotent
        let user = state.assign_agent_to_user("user-1", "support-agent").unwrap();
        assert_eq!(user.agent_ids.len(), 1);

        let user = state.remove_agent_from_user("user-1", "support-agent").unwrap();
        assert!(user.agent_ids.is_empty());
        assert!(state.agent("support-agent").unwrap().owner_id.is_none());
    }

    #[test]
    fn test_assign_missing_records() {
        let state = state();
        let now = Utc::now();
        state.users.insert(demo_user("user-1", "a@example.com", now));

        assert!(matches!(
            state.assign_agent_to_user("user-1", "nope"),
            Err(AppError::NotFound("Agent"))
        ));
        state.agents.insert(demo_agent("sales-agent", "Sales", now));
        assert!(matches!(
            state.assign_agent_to_user("ghost", "sales-agent"),
            Err(AppError::NotFound("User"))
        ));
        assert!(state.agents_owned_by("ghost").is_err());
    }

    #[test]
    fn test_phone_assignment_moves_between_agents() {
        let state = state();
        let now = Utc::now();
        state.agents.insert(demo_agent("a", "A", now));
        state.agents.insert(demo_agent("b", "B", now));

        state.sync_phone_assignment("pn-1", None, Some("a"));
        assert_eq!(state.agent("a").unwrap().phone_number_ids, vec!["pn-1"]);

        state.sync_phone_assignment("pn-1", Some("a"), Some("b"));
        assert!(state.agent("a").unwrap().phone_number_ids.is_empty());
        assert_eq!(state.agent("b").unwrap().phone_number_ids, vec!["pn-1"]);

        state.sync_phone_assignment("pn-1", Some("b"), None);
        assert!(state.agent("b").unwrap().phone_number_ids.is_empty());
    }

    #[test]
    fn test_credential_chain_uses_owner() {
        let state = state();
        let now = Utc::now();
        let mut owner = demo_user("owner", "o@example.com", now);
        owner.livekit = Some(LiveKitCredentials::new("owner-key", "owner-secret", "wss://o.livekit.cloud"));
        state.users.insert(owner);

        let mut agent = demo_agent("a", "A", now);
        agent.owner_id = Some("owner".to_string());

        let (creds, source) = state.credential_chain(&agent, None, None).resolve().unwrap();
        assert_eq!(creds.api_key, "owner-key");
        assert_eq!(source, crate::livekit::CredentialSource::AgentOwner);
    }

    #[test]
    fn test_caller_without_credentials_falls_through_to_owner() {
        let state = state();
        let now = Utc::now();
        let mut owner = demo_user("owner", "o@example.com", now);
        owner.livekit = Some(LiveKitCredentials::new("owner-key", "owner-secret", "wss://o.livekit.cloud"));
        state.users.insert(owner);
        state.users.insert(demo_user("caller", "c@example.com", now));

        let mut agent = demo_agent("a", "A", now);
        agent.owner_id = Some("owner".to_string());

        let (creds, source) = state
            .credential_chain(&agent, None, Some("caller"))
            .resolve()
            .unwrap();
        assert_eq!(creds.api_key, "owner-key");
        assert_eq!(source, crate::livekit::CredentialSource::AgentOwner);
    }
}
