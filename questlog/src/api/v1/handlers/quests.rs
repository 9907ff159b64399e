//! v1 Quest handlers.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::v1::dto::{
    ActiveQuestsResponse, CompleteQuestRequest, CompleteQuestResponse, GenerateQuestsResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `GET /api/v1/quests/{name}`
#[utoipa::path(
    get,
    path = "/api/v1/quests/{name}",
    tag = "quests",
    operation_id = "quests.listActive",
    params(("name" = String, Path, description = "Character name")),
    responses(
        (status = 200, description = "Active quests", body = ActiveQuestsResponse),
        (status = 404, description = "Unknown user", body = ApiError),
    )
)]
pub async fn list_active_quests(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResponse<ActiveQuestsResponse> {
    match state.quests.active_quests(&name).await {
        Ok(quests) => ApiResponse::success(ActiveQuestsResponse { quests }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/quests/{name}/generate`
///
/// Runs the two-stage quest pipeline and saves the batch. A pipeline
/// failure writes nothing.
#[utoipa::path(
    post,
    path = "/api/v1/quests/{name}/generate",
    tag = "quests",
    operation_id = "quests.generate",
    params(("name" = String, Path, description = "Character name")),
    responses(
        (status = 201, description = "Quests generated and saved", body = GenerateQuestsResponse),
        (status = 404, description = "Unknown user or character", body = ApiError),
        (status = 502, description = "LLM pipeline failed", body = ApiError),
    )
)]
pub async fn generate_quests(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResponse<GenerateQuestsResponse> {
    match state.quests.generate_for_user(&name).await {
        Ok(generated) => ApiResponse::created(generated.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/quests/{name}/complete`
#[utoipa::path(
    post,
    path = "/api/v1/quests/{name}/complete",
    tag = "quests",
    operation_id = "quests.complete",
    params(("name" = String, Path, description = "Character name")),
    request_body = CompleteQuestRequest,
    responses(
        (status = 200, description = "Activity logged and quest completed", body = CompleteQuestResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Unknown user or quest", body = ApiError),
    )
)]
pub async fn complete_quest(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CompleteQuestRequest>,
) -> ApiResponse<CompleteQuestResponse> {
    let completion = match req.into_completion() {
        Ok(c) => c,
        Err(e) => return e.into(),
    };

    match state.quests.complete_quest(&name, &completion).await {
        Ok(()) => ApiResponse::success(CompleteQuestResponse {
            quest_id: completion.quest_id,
            completed: true,
        }),
        Err(e) => e.into(),
    }
}
