use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{QuestlogError, Result};
use crate::intelligence::{DailyInsight, QuestionsResult};
use crate::models::{
    ActivityLog, CharacterProfile, DatabaseIds, Quest, QuestRecord, QuestStatus, TimelineEntry,
    UserRecord, UserRegistration,
};

use super::{AdminStore, PageRef, WorkspaceConnector, WorkspaceStore};

#[derive(Default)]
pub(crate) struct WorkspaceState {
    pub databases: DatabaseIds,
    pub characters: Vec<CharacterProfile>,
    pub quests: Vec<QuestRecord>,
    pub activities: Vec<(NaiveDate, ActivityLog)>,
    pub journals: HashMap<NaiveDate, String>,
    pub timelines: HashMap<NaiveDate, Vec<TimelineEntry>>,
    pub questions: Vec<(NaiveDate, QuestionsResult)>,
    pub insights: Vec<(NaiveDate, DailyInsight)>,
    pub fail_quest_writes: bool,
}

/// Workspace double backed by plain collections.
#[derive(Default)]
pub(crate) struct InMemoryWorkspace {
    pub state: Mutex<WorkspaceState>,
}

impl InMemoryWorkspace {
    pub fn with_databases(databases: DatabaseIds) -> Self {
        let workspace = Self::default();
        workspace.state.lock().unwrap().databases = databases;
        workspace
    }

    fn page(id: String) -> PageRef {
        PageRef {
            url: format!("https://notion.so/{id}"),
            id,
        }
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryWorkspace {
    async fn find_databases(&self, _page_id: &str) -> Result<DatabaseIds> {
        Ok(self.state.lock().unwrap().databases.clone())
    }

    async fn save_character(&self, _db_id: &str, profile: &CharacterProfile) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.characters.push(profile.clone());
        Ok(format!("character-{}", state.characters.len()))
    }

    async fn get_character(&self, _db_id: &str) -> Result<Option<CharacterProfile>> {
        Ok(self.state.lock().unwrap().characters.last().cloned())
    }

    async fn update_character(&self, _db_id: &str, profile: &CharacterProfile) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .characters
            .iter_mut()
            .find(|c| c.name == profile.name)
            .ok_or_else(|| QuestlogError::NotFound(format!("Character {} not found", profile.name)))?;
        *existing = profile.clone();
        Ok(())
    }

    async fn save_quest(&self, _db_id: &str, quest: &Quest) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.fail_quest_writes {
            return Err(QuestlogError::Notion("write rejected".to_string()));
        }
        let id = format!("quest-{}", state.quests.len() + 1);
        state.quests.push(QuestRecord {
            id: id.clone(),
            title: quest.title.clone(),
            kind: Some(quest.kind),
            description: quest.description.clone(),
            status: QuestStatus::Active,
        });
        Ok(id)
    }

    async fn get_active_quests(&self, _db_id: &str) -> Result<Vec<QuestRecord>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .quests
            .iter()
            .filter(|q| q.status == QuestStatus::Active)
            .cloned()
            .collect())
    }

    async fn complete_quest(&self, quest_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let quest = state
            .quests
            .iter_mut()
            .find(|q| q.id == quest_id)
            .ok_or_else(|| QuestlogError::NotFound(format!("Quest {quest_id} not found")))?;
        quest.status = QuestStatus::Completed;
        Ok(())
    }

    async fn save_activity_log(
        &self,
        _db_id: &str,
        date: NaiveDate,
        log: &ActivityLog,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.activities.push((date, log.clone()));
        Ok(format!("activity-{}", state.activities.len()))
    }

    async fn get_daily_activities(&self, _db_id: &str, date: NaiveDate) -> Result<Vec<ActivityLog>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .activities
            .iter()
            .filter(|(day, _)| *day == date)
            .map(|(_, log)| log.clone())
            .collect())
    }

    async fn create_timeline_pages(
        &self,
        _db_id: &str,
        date: NaiveDate,
        activities: &[ActivityLog],
    ) -> Result<PageRef> {
        let mut state = self.state.lock().unwrap();
        state
            .timelines
            .insert(date, activities.iter().map(TimelineEntry::from).collect());
        state.journals.entry(date).or_default();
        Ok(Self::page(format!("timeline-{date}")))
    }

    async fn get_journal(&self, _db_id: &str, date: NaiveDate) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().journals.get(&date).cloned())
    }

    async fn get_timeline(&self, _db_id: &str, date: NaiveDate) -> Result<Vec<TimelineEntry>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .timelines
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_questions_page(
        &self,
        _db_id: &str,
        date: NaiveDate,
        questions: &QuestionsResult,
    ) -> Result<PageRef> {
        self.state
            .lock()
            .unwrap()
            .questions
            .push((date, questions.clone()));
        Ok(Self::page(format!("questions-{date}")))
    }

    async fn create_insight_page(
        &self,
        _db_id: &str,
        date: NaiveDate,
        insight: &DailyInsight,
    ) -> Result<PageRef> {
        self.state
            .lock()
            .unwrap()
            .insights
            .push((date, insight.clone()));
        Ok(Self::page(format!("insight-{date}")))
    }
}

/// Admin registry double.
#[derive(Default)]
pub(crate) struct InMemoryAdmin {
    pub users: Mutex<Vec<(UserRecord, bool)>>,
    pub generated: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl InMemoryAdmin {
    pub fn with_user(record: UserRecord) -> Self {
        let admin = Self::default();
        admin.users.lock().unwrap().push((record, true));
        admin
    }

    pub fn add_user(&self, record: UserRecord, active: bool) {
        self.users.lock().unwrap().push((record, active));
    }
}

#[async_trait]
impl AdminStore for InMemoryAdmin {
    async fn get_user(&self, name: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(user, _)| user.name == name)
            .map(|(user, _)| user.clone()))
    }

    async fn list_active_users(&self) -> Result<Vec<String>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, active)| *active)
            .map(|(user, _)| user.name.clone())
            .collect())
    }

    async fn register_user(
        &self,
        registration: &UserRegistration,
        database_ids: &DatabaseIds,
    ) -> Result<String> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(u, _)| u.name == registration.character_name) {
            return Err(QuestlogError::Validation("already registered".to_string()));
        }
        users.push((
            UserRecord {
                name: registration.character_name.clone(),
                notion_api_key: Some(registration.notion_api_key.clone()),
                notion_url: Some(registration.notion_page_url.clone()),
                database_ids: database_ids.clone(),
            },
            true,
        ));
        Ok(format!("user-{}", users.len()))
    }

    async fn mark_quests_generated(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        self.generated.lock().unwrap().push((name.to_string(), at));
        Ok(())
    }
}

/// Hands out workspaces registered per token.
#[derive(Default)]
pub(crate) struct StaticConnector {
    pub workspaces: Mutex<HashMap<String, Arc<InMemoryWorkspace>>>,
}

impl StaticConnector {
    pub fn with(token: &str, workspace: Arc<InMemoryWorkspace>) -> Self {
        let connector = Self::default();
        connector.insert(token, workspace);
        connector
    }

    pub fn insert(&self, token: &str, workspace: Arc<InMemoryWorkspace>) {
        self.workspaces
            .lock()
            .unwrap()
            .insert(token.to_string(), workspace);
    }
}

impl WorkspaceConnector for StaticConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn WorkspaceStore>> {
        let workspace = self
            .workspaces
            .lock()
            .unwrap()
            .get(api_key)
            .cloned()
            .ok_or_else(|| QuestlogError::ApiAuth("unknown token".to_string()))?;
        Ok(workspace as Arc<dyn WorkspaceStore>)
    }
}
