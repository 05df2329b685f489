//! Configuration types for the booking agent

use serde::{Deserialize, Serialize};

/// Configuration for the conversational agent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Persona name used in logs
    #[serde(default = "default_agent_name")]
    pub name: String,
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmProviderConfig,
    /// Replacement for the built-in prompt (Tera syntax)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    /// Maximum reasoning iterations per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Timeout for a whole turn, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Offset for today's date, the example instant and naive tool input
    #[serde(default = "default_user_utc_offset")]
    pub user_utc_offset: String,
    /// Feed malformed model output back as an observation instead of failing
    #[serde(default = "default_true")]
    pub handle_parsing_errors: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            llm: LlmProviderConfig::default(),
            prompt_template: None,
            max_iterations: default_max_iterations(),
            timeout_seconds: default_timeout(),
            user_utc_offset: default_user_utc_offset(),
            handle_parsing_errors: true,
        }
    }
}

fn default_agent_name() -> String {
    "TailorTalk".to_string()
}

fn default_max_iterations() -> u32 {
    15
}

fn default_timeout() -> u64 {
    120
}

fn default_user_utc_offset() -> String {
    "+05:30".to_string()
}

fn default_true() -> bool {
    true
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    /// Provider type
    #[serde(default)]
    pub provider: LlmProviderType,
    /// Model name/identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom base URL (for proxies and tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output token cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::default(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            timeout_seconds: default_llm_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Google Gemini
    #[default]
    #[serde(alias = "google")]
    Gemini,
}

impl std::fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderType::Gemini => write!(f, "gemini"),
        }
    }
}

/// Session store lifecycle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Evict sessions idle for longer than this; never when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_seconds: Option<u64>,
    /// Keep at most this many turns per session; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<usize>,
    /// How often the eviction sweep runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: None,
            max_turns: None,
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}
