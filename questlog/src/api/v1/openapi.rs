use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Questlog API",
        version = "1.0.0",
        description = "Turns a Notion workspace into a quest log: character onboarding, LLM-generated quests, daily timelines, reflection questions and insight reports.",
    ),
    paths(
        handlers::health::health_check,
        handlers::characters::create_character,
        handlers::characters::get_character,
        handlers::characters::update_character,
        handlers::quests::list_active_quests,
        handlers::quests::generate_quests,
        handlers::quests::complete_quest,
        handlers::daily::wrap_up,
        handlers::daily::reflection,
        handlers::daily::insight,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Domain
        crate::models::CharacterProfile,
        crate::models::DatabaseIds,
        crate::models::Quest,
        crate::models::QuestKind,
        crate::models::QuestRecord,
        crate::models::QuestStatus,
        crate::models::ActivityLog,
        crate::intelligence::DailyInsight,
        crate::store::PageRef,
        // Characters
        dto::characters::CreateCharacterRequest,
        dto::characters::UpdateCharacterRequest,
        dto::characters::CreateCharacterResponse,
        // Quests
        dto::quests::ActiveQuestsResponse,
        dto::quests::GenerateQuestsResponse,
        dto::quests::CompleteQuestRequest,
        dto::quests::CompleteQuestResponse,
        // Daily
        dto::daily::DailyRequest,
        dto::daily::WrapUpResponse,
        dto::daily::ReflectionResponse,
        dto::daily::InsightResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::LlmStatus,
        handlers::health::QuestScheduleStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "characters", description = "Character onboarding and updates"),
        (name = "quests", description = "Quest generation, listing and completion"),
        (name = "daily", description = "Daily timeline, reflection questions and insight reports"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
