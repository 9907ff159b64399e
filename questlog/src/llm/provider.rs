use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{QuestlogError, Result};
use crate::llm::api::LlmApiClient;
use crate::llm::gemini::GeminiClient;
use crate::llm::schema::JsonSchemaSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    Gemini,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    pub fn label(&self) -> &'static str {
        match self {
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::Gemini => "gemini",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        }
    }
}

/// Sampling settings for one call. Providers ignore fields they lack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    /// Settings for the free-text analysis stage.
    pub fn reasoning() -> Self {
        Self {
            temperature: Some(0.7),
            top_p: Some(0.95),
            top_k: Some(64),
            max_output_tokens: Some(65536),
        }
    }

    /// Settings for the schema-constrained refinement stage.
    pub fn formatting() -> Self {
        Self {
            temperature: Some(0.2),
            top_p: None,
            top_k: None,
            max_output_tokens: Some(2048),
        }
    }
}

/// A generative-text provider.
///
/// Implementations make exactly one logical request per call; callers own
/// any retry or timeout policy around the whole chain.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier for logs.
    fn model_name(&self) -> &str;

    /// Free-text completion.
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String>;

    /// Completion constrained to `schema`. Returns the raw JSON value; it
    /// may be a JSON-encoded string when the provider wraps its output.
    async fn complete_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        schema: &JsonSchemaSpec,
        options: &GenerationOptions,
    ) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            "gemini" => LlmBackend::Gemini,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    fn available_config(&self) -> Result<&LlmConfig> {
        if !self.is_available() {
            return Err(QuestlogError::LlmUnavailable(self.unavailable_reason()));
        }

        self.config()
            .ok_or_else(|| QuestlogError::LlmUnavailable("No config available".to_string()))
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM completion is not implemented yet".to_string(),
        }
    }
}

#[async_trait]
impl GenerativeModel for LlmProvider {
    fn model_name(&self) -> &str {
        self.config()
            .map(|c| c.model.as_str())
            .unwrap_or("unavailable")
    }

    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String> {
        let config = self.available_config()?;

        if self.backend == LlmBackend::Gemini {
            let client = GeminiClient::new(config)?;
            return client.complete(prompt, system_prompt, options).await;
        }

        let client = LlmApiClient::new(config)?;
        client.complete(prompt, system_prompt, Some(options)).await
    }

    async fn complete_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        schema: &JsonSchemaSpec,
        options: &GenerationOptions,
    ) -> Result<Value> {
        let config = self.available_config()?;

        if self.backend == LlmBackend::Gemini {
            let client = GeminiClient::new(config)?;
            return client
                .complete_json(prompt, system_prompt, schema, options)
                .await;
        }

        let client = LlmApiClient::new(config)?;
        client
            .complete_json(prompt, system_prompt, schema, Some(options))
            .await
    }
}
