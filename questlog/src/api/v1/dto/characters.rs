//! Character request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::models::{CharacterProfile, DatabaseIds, UserRegistration};
use crate::services::{CharacterPatch, CreatedCharacter};

/// Request body for `POST /api/v1/characters`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    /// Character name; also the user's key in the admin workspace.
    pub character_name: String,
    /// Personality-type code, typically a 4-letter MBTI code.
    pub personality_type: String,
    /// Integration token for the user's Notion workspace.
    pub notion_api_key: String,
    /// URL of the page that holds the character, activity, quest and diary databases.
    pub notion_page_url: String,
    pub goals: Option<String>,
    pub preferences: Option<String>,
}

impl CreateCharacterRequest {
    pub fn registration(&self) -> UserRegistration {
        UserRegistration {
            character_name: self.character_name.clone(),
            personality_type: self.personality_type.clone(),
            notion_api_key: self.notion_api_key.clone(),
            notion_page_url: self.notion_page_url.clone(),
        }
    }
}

/// Request body for `PATCH /api/v1/characters/{name}`. Omitted fields are kept.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    pub personality_type: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
}

impl From<UpdateCharacterRequest> for CharacterPatch {
    fn from(req: UpdateCharacterRequest) -> Self {
        Self {
            personality_type: req.personality_type,
            goals: req.goals,
            preferences: req.preferences,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterResponse {
    pub character: CharacterProfile,
    /// Databases discovered under the workspace page.
    pub database_ids: DatabaseIds,
    /// Id of the new row in the character database.
    pub page_id: String,
}

impl From<CreatedCharacter> for CreateCharacterResponse {
    fn from(created: CreatedCharacter) -> Self {
        Self {
            character: created.profile,
            database_ids: created.database_ids,
            page_id: created.character_page_id,
        }
    }
}
