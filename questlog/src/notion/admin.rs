use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::{QuestlogError, Result};
use crate::models::{DatabaseIds, UserRecord, UserRegistration};
use crate::store::AdminStore;

use super::blocks::{self, block_text, code_language, page_title, select_property, title_property};
use super::client::{Block, DatabaseQuery, NotionClient, Page};

const API_KEY_LABEL: &str = "Notion API Key:";
const URL_LABEL: &str = "Notion URL:";
const ACTIVE_STATUS: &str = "Active";
const LAST_GENERATED_PROPERTY: &str = "Last Quest Generated";

/// Users database in the admin workspace.
///
/// Each user is a row named after their character with a `Status` select.
/// The page body holds the workspace URL, the integration token and a JSON
/// code block of database ids.
#[derive(Clone)]
pub struct NotionAdmin {
    client: NotionClient,
    users_db_id: String,
}

impl NotionAdmin {
    pub fn new(client: NotionClient, users_db_id: impl Into<String>) -> Self {
        Self {
            client,
            users_db_id: users_db_id.into(),
        }
    }

    async fn find_user_page(&self, name: &str) -> Result<Option<Page>> {
        let query = DatabaseQuery::filtered(json!({
            "property": "Name",
            "title": {"equals": name}
        }))
        .limit(1);
        Ok(self
            .client
            .query_database(&self.users_db_id, &query)
            .await?
            .into_iter()
            .next())
    }
}

/// Read a user record back out of the admin page body.
pub fn user_from_blocks(name: &str, page_blocks: &[Block]) -> UserRecord {
    let mut record = UserRecord {
        name: name.to_string(),
        notion_api_key: None,
        notion_url: None,
        database_ids: DatabaseIds::default(),
    };

    for block in page_blocks {
        match block.kind.as_str() {
            "paragraph" => {
                let Some(text) = block_text(block) else {
                    continue;
                };
                if let Some(key) = text.split_once(API_KEY_LABEL).map(|(_, rest)| rest.trim()) {
                    record.notion_api_key = (!key.is_empty()).then(|| key.to_string());
                } else if let Some(url) = text.split_once(URL_LABEL).map(|(_, rest)| rest.trim()) {
                    record.notion_url = (!url.is_empty()).then(|| url.to_string());
                }
            }
            "code" if code_language(block) == Some("json") => {
                let text = block_text(block).unwrap_or_default();
                match serde_json::from_str::<DatabaseIds>(&text) {
                    Ok(ids) => record.database_ids = ids,
                    Err(e) => {
                        tracing::warn!(user = name, error = %e, "Unreadable database id block");
                    }
                }
            }
            _ => {}
        }
    }

    record
}

#[async_trait]
impl AdminStore for NotionAdmin {
    async fn get_user(&self, name: &str) -> Result<Option<UserRecord>> {
        let Some(page) = self.find_user_page(name).await? else {
            return Ok(None);
        };
        let children = self.client.list_block_children(&page.id).await?;
        Ok(Some(user_from_blocks(name, &children)))
    }

    async fn list_active_users(&self) -> Result<Vec<String>> {
        let query = DatabaseQuery::filtered(json!({
            "property": "Status",
            "select": {"equals": ACTIVE_STATUS}
        }));
        let pages = self.client.query_database(&self.users_db_id, &query).await?;
        Ok(pages.iter().filter_map(page_title).collect())
    }

    async fn register_user(
        &self,
        registration: &UserRegistration,
        database_ids: &DatabaseIds,
    ) -> Result<String> {
        if self
            .find_user_page(&registration.character_name)
            .await?
            .is_some()
        {
            return Err(QuestlogError::Validation(format!(
                "User {} is already registered",
                registration.character_name
            )));
        }

        let properties = json!({
            "Name": title_property(&registration.character_name),
            "Status": select_property(ACTIVE_STATUS),
        });
        let children = vec![
            blocks::paragraph(&format!("{URL_LABEL} {}", registration.notion_page_url)),
            blocks::paragraph(&format!("{API_KEY_LABEL} {}", registration.notion_api_key)),
            blocks::code(&serde_json::to_string(database_ids)?, "json"),
        ];

        let page = self
            .client
            .create_page(&self.users_db_id, properties, children)
            .await?;
        tracing::info!(user = %registration.character_name, page_id = %page.id, "Registered user");
        Ok(page.id)
    }

    async fn mark_quests_generated(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        let page = self
            .find_user_page(name)
            .await?
            .ok_or_else(|| QuestlogError::NotFound(format!("User {name} not found")))?;
        let properties = json!({
            LAST_GENERATED_PROPERTY: blocks::date_property(&at.to_rfc3339()),
        });
        self.client.update_page(&page.id, properties).await?;
        Ok(())
    }
}
