//! Quest request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ActivityLog, Quest, QuestRecord};
use crate::services::{GeneratedQuests, QuestCompletion};

use super::common::parse_date;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ActiveQuestsResponse {
    pub quests: Vec<QuestRecord>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestsResponse {
    pub quests: Vec<Quest>,
    /// Ids of the pages created in the quest database, in quest order.
    pub page_ids: Vec<String>,
}

impl From<GeneratedQuests> for GenerateQuestsResponse {
    fn from(generated: GeneratedQuests) -> Self {
        Self {
            quests: generated.quests,
            page_ids: generated.page_ids,
        }
    }
}

/// Request body for `POST /api/v1/quests/{name}/complete`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuestRequest {
    pub quest_id: String,
    /// Day the activity belongs to (`YYYY-MM-DD`), defaults to today.
    pub date: Option<String>,
    pub activity: ActivityLog,
}

impl CompleteQuestRequest {
    pub fn into_completion(self) -> Result<QuestCompletion> {
        Ok(QuestCompletion {
            date: parse_date(self.date.as_deref())?,
            quest_id: self.quest_id,
            activity: self.activity,
        })
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuestResponse {
    pub quest_id: String,
    pub completed: bool,
}
