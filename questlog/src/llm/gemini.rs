use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{QuestlogError, Result};
use crate::llm::provider::GenerationOptions;
use crate::llm::schema::JsonSchemaSpec;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    /// Set on thought-summary parts emitted by thinking models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| QuestlogError::Llm("API key required for this provider".to_string()))?;

        let (_, model) = parse_llm_provider_model(&config.model);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                QuestlogError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model: model.to_string(),
            max_retries: config.max_retries,
        })
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(QuestlogError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = Self::build_request(prompt, system_prompt, options, "text/plain");
        let text = self.send(&request).await?;
        tracing::debug!(
            model = %self.model,
            response_len = text.len(),
            "Gemini text response received"
        );
        Ok(text)
    }

    /// JSON-mode completion. The schema travels inside the prompt.
    pub async fn complete_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        schema: &JsonSchemaSpec,
        options: &GenerationOptions,
    ) -> Result<Value> {
        if prompt.trim().is_empty() {
            return Err(QuestlogError::Validation("Prompt cannot be empty".to_string()));
        }

        let prompt = format!(
            "{prompt}\n\nRespond with a single JSON object matching this schema:\n{}",
            schema.to_prompt_block()
        );
        let request = Self::build_request(&prompt, system_prompt, options, "application/json");
        let text = self.send(&request).await?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(text)),
        }
    }

    fn build_request(
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerationOptions,
        mime_type: &str,
    ) -> GenerateContentRequest {
        let system_instruction = system_prompt
            .filter(|value| !value.trim().is_empty())
            .map(|value| Content {
                role: None,
                parts: vec![Part {
                    text: Some(value.to_string()),
                    thought: None,
                }],
            });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    thought: None,
                }],
            }],
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                top_k: options.top_k,
                max_output_tokens: options.max_output_tokens,
                response_mime_type: mime_type.to_string(),
            },
        }
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let mut last_error: Option<QuestlogError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay_ms = 100 * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response = match self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    let mapped = QuestlogError::Llm(format!("LLM request failed: {error}"));
                    if attempt < self.max_retries {
                        tracing::warn!(attempt, error = %mapped, "Retrying Gemini request");
                        last_error = Some(mapped);
                        continue;
                    }
                    return Err(mapped);
                }
            };

            let status = response.status();
            if status.is_success() {
                let body: GenerateContentResponse = response.json().await.map_err(|error| {
                    QuestlogError::Llm(format!("Failed to parse LLM response: {error}"))
                })?;
                return Self::extract_text(body);
            }

            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            match status {
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    return Err(QuestlogError::LlmRateLimit { retry_after });
                }
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    return Err(QuestlogError::Llm(format!(
                        "LLM authentication failed: {status}"
                    )));
                }
                _ => {}
            }

            let mapped = QuestlogError::Llm(format!("LLM API error ({status}): {body}"));
            if status.is_server_error() && attempt < self.max_retries {
                tracing::warn!(attempt, error = %mapped, "Retrying Gemini request");
                last_error = Some(mapped);
                continue;
            }
            return Err(mapped);
        }

        Err(last_error.unwrap_or_else(|| {
            QuestlogError::Llm("LLM completion failed after retries".to_string())
        }))
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| QuestlogError::Llm("LLM response contained no candidates".to_string()))?;

        let text: String = content
            .parts
            .into_iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(QuestlogError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(text)
    }
}
