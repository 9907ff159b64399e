use serde::Deserialize;
use std::env;

use crate::models::QuestCountPolicy;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub notion: NotionConfig,
    /// Free-text "thinking" provider used for first-stage analysis.
    pub reasoner: Option<LlmConfig>,
    /// Schema-constrained provider used to refine reasoner output.
    pub formatter: Option<LlmConfig>,
    pub quests: QuestConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    /// Integration token for the admin workspace holding the users database.
    pub admin_token: Option<String>,
    pub admin_users_db_id: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Extra attempts on transient failures. Zero keeps single-shot calls.
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestConfig {
    pub check_interval_secs: u64,
    /// Users with this many active quests or fewer get a new batch.
    pub min_active_quests: usize,
    pub count_policy: QuestCountPolicy,
}

pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_REASONER_MODEL: &str = "gemini/gemini-2.0-flash-thinking-exp-01-21";
pub const DEFAULT_FORMATTER_MODEL: &str = "openai/gpt-4o-mini";

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("QUESTLOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("QUESTLOG_PORT", 8000),
                api_keys: env::var("QUESTLOG_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            notion: NotionConfig {
                admin_token: env_non_empty("ADMIN_NOTION_TOKEN"),
                admin_users_db_id: env_non_empty("ADMIN_USERS_DB_ID"),
                base_url: env::var("NOTION_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_NOTION_BASE_URL.to_string()),
                timeout_secs: parse_env_or("NOTION_TIMEOUT", 30),
            },
            reasoner: Some(LlmConfig {
                model: env::var("REASONER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_REASONER_MODEL.to_string()),
                api_key: env_non_empty("GEMINI_API_KEY"),
                base_url: env_non_empty("REASONER_BASE_URL"),
                timeout_secs: parse_env_or("REASONER_TIMEOUT", 120),
                max_retries: parse_env_or("REASONER_MAX_RETRIES", 0),
            }),
            formatter: Some(LlmConfig {
                model: env::var("FORMATTER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_FORMATTER_MODEL.to_string()),
                api_key: env_non_empty("OPENAI_API_KEY"),
                base_url: env_non_empty("FORMATTER_BASE_URL"),
                timeout_secs: parse_env_or("FORMATTER_TIMEOUT", 60),
                max_retries: parse_env_or("FORMATTER_MAX_RETRIES", 0),
            }),
            quests: QuestConfig {
                check_interval_secs: parse_env_or("QUEST_CHECK_INTERVAL", 3600),
                min_active_quests: parse_env_or("MIN_QUEST_COUNT", 2),
                count_policy: parse_env_or("QUEST_COUNT_POLICY", QuestCountPolicy::Standard),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers. All but `gemini` speak the OpenAI chat API.
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "gemini"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
