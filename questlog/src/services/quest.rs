use chrono::{NaiveDate, Utc};

use crate::error::{QuestlogError, Result};
use crate::intelligence::QuestOrchestrator;
use crate::models::{ActivityLog, DatabaseKind, Quest, QuestCountPolicy, QuestRecord};

use super::workspaces::{UserWorkspace, Workspaces};

/// Quests written to a user's workspace by one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedQuests {
    pub quests: Vec<Quest>,
    pub page_ids: Vec<String>,
}

/// A finished quest and the activity to log for it.
#[derive(Debug, Clone)]
pub struct QuestCompletion {
    pub quest_id: String,
    pub date: NaiveDate,
    pub activity: ActivityLog,
}

#[derive(Clone)]
pub struct QuestService {
    workspaces: Workspaces,
    orchestrator: QuestOrchestrator,
    policy: QuestCountPolicy,
}

impl QuestService {
    pub fn new(
        workspaces: Workspaces,
        orchestrator: QuestOrchestrator,
        policy: QuestCountPolicy,
    ) -> Self {
        Self {
            workspaces,
            orchestrator,
            policy,
        }
    }

    /// Generate a quest batch from the user's character and save it.
    pub async fn generate_for_user(&self, name: &str) -> Result<GeneratedQuests> {
        let workspace = self.workspaces.open(name).await?;
        self.generate_in(&workspace).await
    }

    pub(crate) async fn generate_in(&self, workspace: &UserWorkspace) -> Result<GeneratedQuests> {
        let name = workspace.user.name.as_str();
        let character_db = workspace.database(DatabaseKind::Character)?;
        let quest_db = workspace.database(DatabaseKind::Quest)?;

        let character = workspace
            .store
            .get_character(character_db)
            .await?
            .ok_or_else(|| QuestlogError::NotFound(format!("No character found for {name}")))?;

        let result = self
            .orchestrator
            .generate_quests(&character.to_context(), self.policy)
            .await?;

        let mut page_ids = Vec::with_capacity(result.quests.len());
        for quest in &result.quests {
            page_ids.push(workspace.store.save_quest(quest_db, quest).await?);
        }

        self.workspaces
            .admin()
            .mark_quests_generated(name, Utc::now())
            .await?;

        tracing::info!(user = name, count = page_ids.len(), "Saved generated quests");
        Ok(GeneratedQuests {
            quests: result.quests,
            page_ids,
        })
    }

    pub async fn active_quests(&self, name: &str) -> Result<Vec<QuestRecord>> {
        let workspace = self.workspaces.open(name).await?;
        Self::active_in(&workspace).await
    }

    pub(crate) async fn active_in(workspace: &UserWorkspace) -> Result<Vec<QuestRecord>> {
        let quest_db = workspace.database(DatabaseKind::Quest)?;
        workspace.store.get_active_quests(quest_db).await
    }

    /// Log the activity and mark the quest completed.
    pub async fn complete_quest(&self, name: &str, completion: &QuestCompletion) -> Result<()> {
        if completion.quest_id.trim().is_empty() {
            return Err(QuestlogError::Validation("Quest id is required".to_string()));
        }

        let workspace = self.workspaces.open(name).await?;
        let activity_db = workspace.database(DatabaseKind::Activity)?;

        workspace
            .store
            .save_activity_log(activity_db, completion.date, &completion.activity)
            .await?;
        workspace.store.complete_quest(&completion.quest_id).await?;

        tracing::info!(user = name, quest_id = %completion.quest_id, "Quest completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::intelligence::testing::ScriptedModel;
    use crate::models::{CharacterProfile, DatabaseIds, QuestStatus, UserRecord};
    use crate::store::memory::{InMemoryAdmin, InMemoryWorkspace, StaticConnector};

    fn ids() -> DatabaseIds {
        DatabaseIds {
            character: Some("char-db".to_string()),
            activity: Some("activity-db".to_string()),
            quest: Some("quest-db".to_string()),
            diary: Some("diary-db".to_string()),
        }
    }

    fn user() -> UserRecord {
        UserRecord {
            name: "Hero".to_string(),
            notion_api_key: Some("token".to_string()),
            notion_url: None,
            database_ids: ids(),
        }
    }

    fn service_with(
        workspace: Arc<InMemoryWorkspace>,
        formatter: ScriptedModel,
    ) -> (QuestService, Arc<InMemoryAdmin>) {
        let admin = Arc::new(InMemoryAdmin::with_user(user()));
        let connector = Arc::new(StaticConnector::with("token", workspace));
        let orchestrator = QuestOrchestrator::new(
            Arc::new(ScriptedModel::text("plan")),
            Arc::new(formatter),
        );
        let service = QuestService::new(
            Workspaces::new(admin.clone(), connector),
            orchestrator,
            QuestCountPolicy::Standard,
        );
        (service, admin)
    }

    fn seeded_workspace() -> Arc<InMemoryWorkspace> {
        let workspace = Arc::new(InMemoryWorkspace::with_databases(ids()));
        workspace.state.lock().unwrap().characters.push(CharacterProfile {
            name: "Hero".to_string(),
            personality_type: Some("INTJ".to_string()),
            goals: None,
            preferences: None,
        });
        workspace
    }

    fn quests_reply() -> ScriptedModel {
        ScriptedModel::json(json!({"quests": [
            {"title": "Main", "kind": "MainQuest", "description": "d"},
            {"title": "Sub", "kind": "SubQuest", "description": "d"}
        ]}))
    }

    #[tokio::test]
    async fn generate_saves_quests_and_stamps_admin() {
        let workspace = seeded_workspace();
        let (service, admin) = service_with(workspace.clone(), quests_reply());

        let generated = service.generate_for_user("Hero").await.unwrap();

        assert_eq!(generated.page_ids.len(), 2);
        assert_eq!(workspace.state.lock().unwrap().quests.len(), 2);
        assert_eq!(admin.generated.lock().unwrap()[0].0, "Hero");
    }

    #[tokio::test]
    async fn generate_for_unknown_user_is_not_found() {
        let (service, _) = service_with(seeded_workspace(), quests_reply());
        assert!(matches!(
            service.generate_for_user("Nobody").await,
            Err(QuestlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pipeline_failure_writes_nothing() {
        let workspace = seeded_workspace();
        let (service, admin) = service_with(workspace.clone(), ScriptedModel::failing());

        assert!(service.generate_for_user("Hero").await.is_err());
        assert!(workspace.state.lock().unwrap().quests.is_empty());
        assert!(admin.generated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_logs_activity_and_closes_quest() {
        let workspace = seeded_workspace();
        let (service, _) = service_with(workspace.clone(), quests_reply());
        service.generate_for_user("Hero").await.unwrap();

        let completion = QuestCompletion {
            quest_id: "quest-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            activity: ActivityLog {
                title: "Main".to_string(),
                start_time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                duration_minutes: Some(60.0),
                thoughts: Some("done".to_string()),
            },
        };
        service.complete_quest("Hero", &completion).await.unwrap();

        let state = workspace.state.lock().unwrap();
        assert_eq!(state.activities.len(), 1);
        assert_eq!(state.quests[0].status, QuestStatus::Completed);
        drop(state);

        let active = service.active_quests("Hero").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Sub");
    }
}
