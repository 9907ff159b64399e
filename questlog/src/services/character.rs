use crate::error::{QuestlogError, Result};
use crate::models::{CharacterProfile, DatabaseIds, DatabaseKind, UserRegistration};
use crate::notion::extract_page_id;

use super::workspaces::Workspaces;

/// A newly onboarded character.
#[derive(Debug, Clone)]
pub struct CreatedCharacter {
    pub profile: CharacterProfile,
    pub database_ids: DatabaseIds,
    pub character_page_id: String,
}

/// Partial update of a character row; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CharacterPatch {
    pub personality_type: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
}

#[derive(Clone)]
pub struct CharacterService {
    workspaces: Workspaces,
}

impl CharacterService {
    pub fn new(workspaces: Workspaces) -> Self {
        Self { workspaces }
    }

    /// Onboard a user: discover their databases, save the character and
    /// register them in the admin workspace.
    pub async fn create(
        &self,
        registration: &UserRegistration,
        goals: Option<String>,
        preferences: Option<String>,
    ) -> Result<CreatedCharacter> {
        let registration = UserRegistration {
            character_name: registration.character_name.trim().to_string(),
            personality_type: registration.personality_type.trim().to_string(),
            notion_api_key: registration.notion_api_key.trim().to_string(),
            notion_page_url: registration.notion_page_url.trim().to_string(),
        };
        let name = registration.character_name.as_str();
        if name.is_empty() {
            return Err(QuestlogError::Validation(
                "Character name is required".to_string(),
            ));
        }
        if registration.notion_api_key.is_empty() {
            return Err(QuestlogError::Validation(
                "Notion API key is required".to_string(),
            ));
        }
        if self.workspaces.admin().get_user(name).await?.is_some() {
            return Err(QuestlogError::Validation(format!(
                "User {name} is already registered"
            )));
        }

        let page_id = extract_page_id(&registration.notion_page_url)?;
        let store = self.workspaces.connect(&registration.notion_api_key)?;
        let database_ids = store.find_databases(&page_id).await?;
        let character_db = database_ids.require(DatabaseKind::Character)?;

        let profile = CharacterProfile {
            name: name.to_string(),
            personality_type: Some(registration.personality_type.clone())
                .filter(|code| !code.is_empty()),
            goals,
            preferences,
        };
        let character_page_id = store.save_character(character_db, &profile).await?;

        self.workspaces
            .admin()
            .register_user(&registration, &database_ids)
            .await?;

        tracing::info!(user = name, "Character created");
        Ok(CreatedCharacter {
            profile,
            database_ids,
            character_page_id,
        })
    }

    pub async fn get(&self, name: &str) -> Result<CharacterProfile> {
        let workspace = self.workspaces.open(name).await?;
        let character_db = workspace.database(DatabaseKind::Character)?;
        workspace
            .store
            .get_character(character_db)
            .await?
            .ok_or_else(|| QuestlogError::NotFound(format!("No character found for {name}")))
    }

    /// Merge the patch into the stored character and write it back.
    pub async fn update(&self, name: &str, patch: CharacterPatch) -> Result<CharacterProfile> {
        let workspace = self.workspaces.open(name).await?;
        let character_db = workspace.database(DatabaseKind::Character)?;
        let mut profile = workspace
            .store
            .get_character(character_db)
            .await?
            .ok_or_else(|| QuestlogError::NotFound(format!("No character found for {name}")))?;

        if let Some(code) = patch.personality_type {
            profile.personality_type = Some(code);
        }
        if let Some(goals) = patch.goals {
            profile.goals = Some(goals);
        }
        if let Some(preferences) = patch.preferences {
            profile.preferences = Some(preferences);
        }

        workspace.store.update_character(character_db, &profile).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::store::memory::{InMemoryAdmin, InMemoryWorkspace, StaticConnector};

    const PAGE_URL: &str = "https://www.notion.so/Quest-0123456789abcdef0123456789abcdef";

    fn ids() -> DatabaseIds {
        DatabaseIds {
            character: Some("char-db".to_string()),
            activity: Some("activity-db".to_string()),
            quest: Some("quest-db".to_string()),
            diary: Some("diary-db".to_string()),
        }
    }

    fn registration() -> UserRegistration {
        UserRegistration {
            character_name: "Hero".to_string(),
            personality_type: "INTP".to_string(),
            notion_api_key: "token".to_string(),
            notion_page_url: PAGE_URL.to_string(),
        }
    }

    fn setup(databases: DatabaseIds) -> (CharacterService, Arc<InMemoryWorkspace>, Arc<InMemoryAdmin>) {
        let workspace = Arc::new(InMemoryWorkspace::with_databases(databases));
        let admin = Arc::new(InMemoryAdmin::default());
        let connector = Arc::new(StaticConnector::with("token", workspace.clone()));
        let service = CharacterService::new(Workspaces::new(admin.clone(), connector));
        (service, workspace, admin)
    }

    #[tokio::test]
    async fn create_saves_character_and_registers_user() {
        let (service, workspace, admin) = setup(ids());

        let created = service
            .create(&registration(), Some("ship it".to_string()), None)
            .await
            .unwrap();

        assert_eq!(created.profile.personality_type.as_deref(), Some("INTP"));
        assert_eq!(created.database_ids, ids());
        assert_eq!(workspace.state.lock().unwrap().characters.len(), 1);
        assert_eq!(admin.users.lock().unwrap()[0].0.name, "Hero");
    }

    #[tokio::test]
    async fn create_requires_character_database() {
        let (service, workspace, admin) = setup(DatabaseIds {
            character: None,
            ..ids()
        });

        let err = service.create(&registration(), None, None).await.unwrap_err();

        assert!(matches!(err, QuestlogError::Validation(_)));
        assert!(workspace.state.lock().unwrap().characters.is_empty());
        assert!(admin.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_bad_url_and_duplicates() {
        let (service, _, _) = setup(ids());
        let mut bad = registration();
        bad.notion_page_url = "https://example.com/nope".to_string();
        assert!(matches!(
            service.create(&bad, None, None).await,
            Err(QuestlogError::Validation(_))
        ));

        service.create(&registration(), None, None).await.unwrap();
        assert!(matches!(
            service.create(&registration(), None, None).await,
            Err(QuestlogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_registers_trimmed_name() {
        let (service, _, admin) = setup(ids());
        let padded = UserRegistration {
            character_name: " Hero ".to_string(),
            notion_api_key: " token ".to_string(),
            notion_page_url: format!(" {PAGE_URL} "),
            ..registration()
        };

        let created = service.create(&padded, None, None).await.unwrap();

        assert_eq!(created.profile.name, "Hero");
        {
            let users = admin.users.lock().unwrap();
            assert_eq!(users[0].0.name, "Hero");
            assert_eq!(users[0].0.notion_api_key.as_deref(), Some("token"));
        }
        assert_eq!(service.get("Hero").await.unwrap().name, "Hero");
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let (service, _, _) = setup(ids());
        service
            .create(&registration(), Some("old goal".to_string()), Some("mornings".to_string()))
            .await
            .unwrap();

        let updated = service
            .update(
                "Hero",
                CharacterPatch {
                    goals: Some("new goal".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.goals.as_deref(), Some("new goal"));
        assert_eq!(updated.preferences.as_deref(), Some("mornings"));
        assert_eq!(service.get("Hero").await.unwrap(), updated);
    }
}
