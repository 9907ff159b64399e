use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;
use crate::llm::LlmProvider;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub reasoner: LlmStatus,
    pub formatter: LlmStatus,
    pub quests: QuestScheduleStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestScheduleStatus {
    pub check_interval_secs: u64,
    pub min_active_quests: usize,
}

fn llm_status(llm: &LlmProvider) -> LlmStatus {
    if llm.is_available() {
        LlmStatus {
            status: "available".to_string(),
            provider: Some(llm.backend().label().to_string()),
            model: llm.config().map(|c| c.model.clone()),
        }
    } else {
        LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
        }
    }
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reasoner: llm_status(&state.reasoner),
        formatter: llm_status(&state.formatter),
        quests: QuestScheduleStatus {
            check_interval_secs: state.config.quests.check_interval_secs,
            min_active_quests: state.config.quests.min_active_quests,
        },
    })
}
