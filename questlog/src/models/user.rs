use serde::{Deserialize, Serialize};

use crate::error::{QuestlogError, Result};

/// The databases a user's workspace must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Character,
    Activity,
    Quest,
    Diary,
}

impl DatabaseKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Activity => "activity",
            Self::Quest => "quest",
            Self::Diary => "diary",
        }
    }

    /// Classify a database by its (case-insensitive) title.
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();
        if title.contains("character") {
            Some(Self::Character)
        } else if title.contains("activity") {
            Some(Self::Activity)
        } else if title.contains("quest") {
            Some(Self::Quest)
        } else if title.contains("diary") {
            Some(Self::Diary)
        } else {
            None
        }
    }
}

/// Database ids discovered in a user's workspace.
///
/// Stored as a JSON code block on the admin user page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseIds {
    #[serde(rename = "character_db_id", skip_serializing_if = "Option::is_none", default)]
    pub character: Option<String>,
    #[serde(rename = "activity_db_id", skip_serializing_if = "Option::is_none", default)]
    pub activity: Option<String>,
    #[serde(rename = "quest_db_id", skip_serializing_if = "Option::is_none", default)]
    pub quest: Option<String>,
    #[serde(rename = "diary_db_id", skip_serializing_if = "Option::is_none", default)]
    pub diary: Option<String>,
}

impl DatabaseIds {
    pub fn get(&self, kind: DatabaseKind) -> Option<&str> {
        match kind {
            DatabaseKind::Character => self.character.as_deref(),
            DatabaseKind::Activity => self.activity.as_deref(),
            DatabaseKind::Quest => self.quest.as_deref(),
            DatabaseKind::Diary => self.diary.as_deref(),
        }
    }

    /// Record an id; the first database of each kind wins.
    pub fn set_if_absent(&mut self, kind: DatabaseKind, id: impl Into<String>) {
        let slot = match kind {
            DatabaseKind::Character => &mut self.character,
            DatabaseKind::Activity => &mut self.activity,
            DatabaseKind::Quest => &mut self.quest,
            DatabaseKind::Diary => &mut self.diary,
        };
        if slot.is_none() {
            *slot = Some(id.into());
        }
    }

    pub fn require(&self, kind: DatabaseKind) -> Result<&str> {
        self.get(kind).ok_or_else(|| {
            QuestlogError::Validation(format!("Workspace has no {} database", kind.name()))
        })
    }
}

/// A registered user as recorded in the admin users database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub notion_api_key: Option<String>,
    pub notion_url: Option<String>,
    pub database_ids: DatabaseIds,
}

impl UserRecord {
    pub fn require_api_key(&self) -> Result<&str> {
        self.notion_api_key.as_deref().ok_or_else(|| {
            QuestlogError::Validation(format!("User {} has no Notion API key", self.name))
        })
    }
}

/// Input for registering a new character and user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    pub character_name: String,
    pub personality_type: String,
    pub notion_api_key: String,
    pub notion_page_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_ids_use_original_json_keys() {
        let ids = DatabaseIds {
            character: Some("c1".to_string()),
            quest: Some("q1".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&ids).unwrap();
        assert_eq!(json["character_db_id"], "c1");
        assert_eq!(json["quest_db_id"], "q1");
        assert!(json.get("diary_db_id").is_none());

        let parsed: DatabaseIds = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ids);
    }

    #[test]
    fn require_missing_database_is_validation_error() {
        let ids = DatabaseIds::default();
        let err = ids.require(DatabaseKind::Diary).unwrap_err();
        assert!(matches!(err, QuestlogError::Validation(msg) if msg.contains("diary")));
    }

    #[test]
    fn kind_from_title() {
        assert_eq!(
            DatabaseKind::from_title("Character DB"),
            Some(DatabaseKind::Character)
        );
        assert_eq!(
            DatabaseKind::from_title("activity log db"),
            Some(DatabaseKind::Activity)
        );
        assert_eq!(DatabaseKind::from_title("Quest DB"), Some(DatabaseKind::Quest));
        assert_eq!(DatabaseKind::from_title("DIARY"), Some(DatabaseKind::Diary));
        assert_eq!(DatabaseKind::from_title("DBIndex"), None);
    }

    #[test]
    fn set_if_absent_keeps_first() {
        let mut ids = DatabaseIds::default();
        ids.set_if_absent(DatabaseKind::Quest, "first");
        ids.set_if_absent(DatabaseKind::Quest, "second");
        assert_eq!(ids.quest.as_deref(), Some("first"));
    }
}
