use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text-to-speech vendor for an agent's voice
///
/// Unknown vendors are preserved verbatim so the console can offer providers
/// before this crate knows about them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceProvider {
    Openai,
    Elevenlabs,
    Deepgram,
    Playht,
    Azure,
    Cartesia,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Openai,
    Anthropic,
    Groq,
    Together,
    Azure,
    Custom,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriberProvider {
    Deepgram,
    Openai,
    Assemblyai,
    Gladia,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

/// Whether the first message is spoken verbatim or generated by the LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstMessageMode {
    #[default]
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Surprised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingFormat {
    Mp3,
    Wav,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPrompts {
    pub system_prompt: String,
    pub first_message: String,
    #[serde(default)]
    pub first_message_mode: FirstMessageMode,

    pub idle_message: Option<String>,
    pub idle_timeout_seconds: Option<u32>,

    pub end_call_message: Option<String>,
    /// Phrases that end the call when spoken by the caller
    pub end_call_phrases: Option<Vec<String>>,

    pub voicemail_message: Option<String>,
    pub voicemail_detection: Option<bool>,

    pub transfer_message: Option<String>,
    pub transfer_number: Option<String>,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system_prompt:
                "You are a helpful voice assistant. Be concise, friendly, and professional."
                    .to_string(),
            first_message: "Hello! How can I help you today?".to_string(),
            first_message_mode: FirstMessageMode::Static,
            idle_message: None,
            idle_timeout_seconds: None,
            end_call_message: None,
            end_call_phrases: None,
            voicemail_message: None,
            voicemail_detection: None,
            transfer_message: None,
            transfer_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub provider: VoiceProvider,
    pub voice_id: String,

    /// 0.5 - 2.0
    pub speed: Option<f64>,
    /// 0.5 - 2.0
    pub pitch: Option<f64>,

    // ElevenLabs tuning
    pub stability: Option<f64>,
    pub similarity_boost: Option<f64>,
    pub style: Option<f64>,
    pub use_speaker_boost: Option<bool>,

    pub filler_injection: Option<bool>,
    pub filler_words: Option<Vec<String>>,

    pub emotion: Option<Emotion>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: VoiceProvider::Openai,
            voice_id: "alloy".to_string(),
            speed: Some(1.0),
            pitch: None,
            stability: None,
            similarity_boost: None,
            style: None,
            use_speaker_boost: None,
            filler_injection: None,
            filler_words: None,
            emotion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriberConfig {
    pub provider: TranscriberProvider,
    pub model: Option<String>,
    pub language: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub keyword_boost: Option<f64>,
    pub endpointing_ms: Option<u32>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            provider: TranscriberProvider::Deepgram,
            model: Some("nova-2".to_string()),
            language: Some("en".to_string()),
            keywords: None,
            keyword_boost: None,
            endpointing_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,

    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,

    #[serde(rename = "customLLMUrl")]
    pub custom_llm_url: Option<String>,
    #[serde(rename = "customLLMHeaders")]
    pub custom_llm_headers: Option<BTreeMap<String, String>>,

    pub knowledge_base_id: Option<String>,
    pub semantic_caching: Option<bool>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Openai,
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.7),
            max_tokens: Some(1024),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            custom_llm_url: None,
            custom_llm_headers: None,
            knowledge_base_id: None,
            semantic_caching: None,
        }
    }
}

/// Turn taking, silence handling, limits and privacy policy for a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationConfig {
    /// 0 - 1
    pub interruption_sensitivity: f64,
    /// 0 - 1, how quickly the agent responds
    pub responsiveness: f64,

    pub silence_timeout_seconds: u32,
    pub max_silence_count: u32,

    pub max_duration_seconds: u32,

    pub backchanneling: Option<bool>,
    pub backchanneling_words: Option<Vec<String>>,

    pub recording_enabled: bool,
    pub recording_format: Option<RecordingFormat>,

    pub transcription_enabled: bool,

    pub hipaa_compliant: Option<bool>,
    pub pci_compliant: Option<bool>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            interruption_sensitivity: 0.5,
            responsiveness: 0.5,
            silence_timeout_seconds: 30,
            max_silence_count: 3,
            max_duration_seconds: 1800,
            backchanneling: None,
            backchanneling_words: None,
            recording_enabled: false,
            recording_format: None,
            transcription_enabled: true,
            hipaa_compliant: None,
            pci_compliant: None,
        }
    }
}

impl ConversationConfig {
    /// Check the 0-1 ranges of the turn-taking knobs
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("interruptionSensitivity", self.interruption_sensitivity),
            ("responsiveness", self.responsiveness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{label} must be between 0 and 1"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterProperty {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    #[serde(rename = "enum")]
    pub allowed: Option<Vec<String>>,
}

/// JSON Schema object describing a function's arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    #[serde(rename = "type", default = "object_type")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterProperty>,
    pub required: Option<Vec<String>>,
}

fn object_type() -> String {
    "object".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Webhook,
    Api,
    Transfer,
    EndCall,
    Dtmf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookMethod {
    Get,
    Post,
}

/// Tool the LLM can call during a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFunction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,

    #[serde(rename = "type")]
    pub kind: FunctionKind,

    pub webhook_url: Option<String>,
    pub webhook_method: Option<WebhookMethod>,
    pub webhook_headers: Option<BTreeMap<String, String>>,

    pub transfer_number: Option<String>,
    pub transfer_message: Option<String>,

    #[serde(rename = "async")]
    pub is_async: Option<bool>,
    pub timeout_ms: Option<u64>,

    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "call.started")]
    CallStarted,
    #[serde(rename = "call.ringing")]
    CallRinging,
    #[serde(rename = "call.answered")]
    CallAnswered,
    #[serde(rename = "call.ended")]
    CallEnded,
    #[serde(rename = "call.failed")]
    CallFailed,
    #[serde(rename = "speech.started")]
    SpeechStarted,
    #[serde(rename = "speech.ended")]
    SpeechEnded,
    #[serde(rename = "transcript.partial")]
    TranscriptPartial,
    #[serde(rename = "transcript.final")]
    TranscriptFinal,
    #[serde(rename = "function.called")]
    FunctionCalled,
    #[serde(rename = "function.completed")]
    FunctionCompleted,
    #[serde(rename = "transfer.initiated")]
    TransferInitiated,
    #[serde(rename = "recording.ready")]
    RecordingReady,
    #[serde(rename = "voicemail.detected")]
    VoicemailDetected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub events: Vec<WebhookEvent>,

    pub secret: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,

    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,

    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    Stdio,
    Http,
    Websocket,
}

/// External tool server reachable over the Model Context Protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    pub id: String,
    pub name: String,
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub transport: McpTransport,
    /// stdio only
    pub command: Option<String>,
    /// http / websocket only
    pub url: Option<String>,

    pub api_key: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,

    pub tools: Option<Vec<String>>,

    pub enabled: bool,
}

/// A voice assistant persona and everything needed to run it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: AgentStatus,

    #[serde(default)]
    pub owner_id: Option<String>,

    #[serde(default)]
    pub prompts: AgentPrompts,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub functions: Vec<AgentFunction>,
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
    #[serde(default)]
    pub mcp_servers: Vec<McpServer>,

    #[serde(default)]
    pub phone_number_ids: Vec<String>,

    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub total_minutes: f64,
    #[serde(default)]
    pub avg_call_duration: f64,
    #[serde(default)]
    pub success_rate: f64,

    pub tags: Option<Vec<String>>,
    pub metadata: Option<BTreeMap<String, String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Active agent with default configuration blocks
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            status: AgentStatus::Active,
            owner_id: None,
            prompts: AgentPrompts::default(),
            voice: VoiceConfig::default(),
            transcriber: TranscriberConfig::default(),
            llm: LlmConfig::default(),
            conversation: ConversationConfig::default(),
            functions: Vec::new(),
            webhooks: Vec::new(),
            mcp_servers: Vec::new(),
            phone_number_ids: Vec::new(),
            total_calls: 0,
            total_minutes: 0.0,
            avg_call_duration: 0.0,
            success_rate: 0.0,
            tags: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the record id from a display name: lower-case, whitespace runs become `-`
    pub fn slug(name: &str) -> String {
        name.split_whitespace()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug() {
        assert_eq!(Agent::slug("Support Agent"), "support-agent");
        assert_eq!(Agent::slug("  Sales\t  Team  Bot "), "sales-team-bot");
        assert_eq!(Agent::slug("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_unknown_provider_is_preserved() {
        let voice: VoiceConfig =
            serde_json::from_value(json!({"provider": "rime", "voiceId": "mist"})).unwrap();
        assert_eq!(voice.provider, VoiceProvider::Other("rime".to_string()));

        let back = serde_json::to_value(&voice).unwrap();
        assert_eq!(back["provider"], "rime");
    }

    #[test]
    fn test_known_provider_round_names() {
        let llm: LlmConfig =
            serde_json::from_value(json!({"provider": "anthropic", "model": "claude"})).unwrap();
        assert_eq!(llm.provider, LlmProvider::Anthropic);
        assert_eq!(serde_json::to_value(&llm).unwrap()["provider"], "anthropic");
    }

    #[test]
    fn test_conversation_ranges() {
        let mut conv = ConversationConfig::default();
        assert!(conv.validate().is_ok());
        conv.responsiveness = 1.5;
        assert!(conv.validate().is_err());
    }

    #[test]
    fn test_function_wire_names() {
        let func: AgentFunction = serde_json::from_value(json!({
            "id": "fn-1",
            "name": "lookup_order",
            "description": "Look up an order",
            "parameters": {
                "type": "object",
                "properties": {"orderId": {"type": "string"}},
                "required": ["orderId"]
            },
            "type": "end_call",
            "async": true,
            "enabled": true
        }))
        .unwrap();
        assert_eq!(func.kind, FunctionKind::EndCall);
        assert_eq!(func.is_async, Some(true));

        let webhook: WebhookConfig = serde_json::from_value(json!({
            "id": "wh-1",
            "name": "crm",
            "url": "https://crm.example.com/hook",
            "events": ["call.ended", "transcript.final"],
            "enabled": true
        }))
        .unwrap();
        assert_eq!(
            webhook.events,
            vec![WebhookEvent::CallEnded, WebhookEvent::TranscriptFinal]
        );
    }
}
