//! v1 Character handlers.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::v1::dto::{CreateCharacterRequest, CreateCharacterResponse, UpdateCharacterRequest};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::models::CharacterProfile;

/// `POST /api/v1/characters`
///
/// Onboards a user: finds the databases under their Notion page, writes the
/// character row and registers them in the admin workspace.
#[utoipa::path(
    post,
    path = "/api/v1/characters",
    tag = "characters",
    operation_id = "characters.create",
    request_body = CreateCharacterRequest,
    responses(
        (status = 201, description = "Character created", body = CreateCharacterResponse),
        (status = 400, description = "Invalid request or already registered", body = ApiError),
        (status = 401, description = "Notion rejected the integration token", body = ApiError),
    )
)]
pub async fn create_character(
    State(state): State<AppState>,
    Json(req): Json<CreateCharacterRequest>,
) -> ApiResponse<CreateCharacterResponse> {
    match state
        .characters
        .create(&req.registration(), req.goals.clone(), req.preferences.clone())
        .await
    {
        Ok(created) => ApiResponse::created(created.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/characters/{name}`
#[utoipa::path(
    get,
    path = "/api/v1/characters/{name}",
    tag = "characters",
    operation_id = "characters.get",
    params(("name" = String, Path, description = "Character name")),
    responses(
        (status = 200, description = "Current character", body = CharacterProfile),
        (status = 404, description = "Unknown user or character", body = ApiError),
    )
)]
pub async fn get_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResponse<CharacterProfile> {
    match state.characters.get(&name).await {
        Ok(profile) => ApiResponse::success(profile),
        Err(e) => e.into(),
    }
}

/// `PATCH /api/v1/characters/{name}`
#[utoipa::path(
    patch,
    path = "/api/v1/characters/{name}",
    tag = "characters",
    operation_id = "characters.update",
    params(("name" = String, Path, description = "Character name")),
    request_body = UpdateCharacterRequest,
    responses(
        (status = 200, description = "Updated character", body = CharacterProfile),
        (status = 404, description = "Unknown user or character", body = ApiError),
    )
)]
pub async fn update_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateCharacterRequest>,
) -> ApiResponse<CharacterProfile> {
    match state.characters.update(&name, req.into()).await {
        Ok(profile) => ApiResponse::success(profile),
        Err(e) => e.into(),
    }
}
