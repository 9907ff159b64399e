use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestlogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notion error: {0}")]
    Notion(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    /// Provider output could not be coerced into the expected record.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl QuestlogError {
    /// True for failures reaching or talking to a generative provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            QuestlogError::Llm(_)
                | QuestlogError::LlmUnavailable(_)
                | QuestlogError::LlmRateLimit { .. }
        )
    }
}

impl IntoResponse for QuestlogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            QuestlogError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            QuestlogError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            QuestlogError::Notion(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            QuestlogError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            QuestlogError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            QuestlogError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            QuestlogError::ApiRateLimit { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            QuestlogError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            QuestlogError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            QuestlogError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            QuestlogError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            QuestlogError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            QuestlogError::Parse(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, QuestlogError>;
