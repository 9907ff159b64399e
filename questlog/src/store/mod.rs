use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intelligence::{DailyInsight, QuestionsResult};
use crate::models::{
    ActivityLog, CharacterProfile, DatabaseIds, Quest, QuestRecord, TimelineEntry, UserRecord,
    UserRegistration,
};

#[cfg(test)]
pub(crate) mod memory;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A page written to the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PageRef {
    pub id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

/// Reads and writes inside one user's workspace.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Locate the character, activity, quest and diary databases under a page.
    async fn find_databases(&self, page_id: &str) -> Result<DatabaseIds>;

    async fn save_character(&self, db_id: &str, profile: &CharacterProfile) -> Result<String>;
    /// Most recently created character row.
    async fn get_character(&self, db_id: &str) -> Result<Option<CharacterProfile>>;
    async fn update_character(&self, db_id: &str, profile: &CharacterProfile) -> Result<()>;

    async fn save_quest(&self, db_id: &str, quest: &Quest) -> Result<String>;
    async fn get_active_quests(&self, db_id: &str) -> Result<Vec<QuestRecord>>;
    async fn complete_quest(&self, quest_id: &str) -> Result<()>;

    async fn save_activity_log(
        &self,
        db_id: &str,
        date: NaiveDate,
        log: &ActivityLog,
    ) -> Result<String>;
    async fn get_daily_activities(&self, db_id: &str, date: NaiveDate) -> Result<Vec<ActivityLog>>;

    /// Write the day's timeline page and an empty journal page. Returns the
    /// timeline page.
    async fn create_timeline_pages(
        &self,
        db_id: &str,
        date: NaiveDate,
        activities: &[ActivityLog],
    ) -> Result<PageRef>;
    async fn get_journal(&self, db_id: &str, date: NaiveDate) -> Result<Option<String>>;
    async fn get_timeline(&self, db_id: &str, date: NaiveDate) -> Result<Vec<TimelineEntry>>;

    async fn create_questions_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        questions: &QuestionsResult,
    ) -> Result<PageRef>;
    async fn create_insight_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        insight: &DailyInsight,
    ) -> Result<PageRef>;
}

/// Registry of users kept in the admin workspace.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn get_user(&self, name: &str) -> Result<Option<UserRecord>>;
    async fn list_active_users(&self) -> Result<Vec<String>>;
    async fn register_user(
        &self,
        registration: &UserRegistration,
        database_ids: &DatabaseIds,
    ) -> Result<String>;
    async fn mark_quests_generated(&self, name: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Opens a workspace store for a user's integration token.
pub trait WorkspaceConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn WorkspaceStore>>;
}
