use serde::{Deserialize, Serialize};

/// Kind of quest, serialized exactly as `MainQuest` / `SubQuest`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub enum QuestKind {
    MainQuest,
    SubQuest,
}

impl QuestKind {
    /// Label used for the `Type` select option in the quest database.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainQuest => "Main Quest",
            Self::SubQuest => "Sub Quest",
        }
    }
}

impl std::fmt::Display for QuestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainQuest => write!(f, "MainQuest"),
            Self::SubQuest => write!(f, "SubQuest"),
        }
    }
}

impl std::str::FromStr for QuestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "mainquest" | "main" => Ok(Self::MainQuest),
            "subquest" | "sub" => Ok(Self::SubQuest),
            _ => Err(format!("Unknown quest kind: {s}")),
        }
    }
}

/// A generated quest. Any reward is described inside `description`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct Quest {
    pub title: String,
    pub kind: QuestKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
}

impl QuestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

/// A quest page read back from the user's quest database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecord {
    pub id: String,
    pub title: String,
    pub kind: Option<QuestKind>,
    pub description: String,
    pub status: QuestStatus,
}

/// How many quests of each kind a generation run asks for.
///
/// The count is requested in the prompt and checked after parsing; a
/// mismatch is logged rather than rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestCountPolicy {
    /// One main quest and two or three sub quests.
    #[default]
    Standard,
    /// Two main quests and two sub quests.
    Balanced,
}

impl QuestCountPolicy {
    pub fn main_range(&self) -> (usize, usize) {
        match self {
            Self::Standard => (1, 1),
            Self::Balanced => (2, 2),
        }
    }

    pub fn sub_range(&self) -> (usize, usize) {
        match self {
            Self::Standard => (2, 3),
            Self::Balanced => (2, 2),
        }
    }

    /// Human-readable count instruction embedded in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Standard => "메인 퀘스트 1개와 서브 퀘스트 2-3개",
            Self::Balanced => "메인 퀘스트 2개와 서브 퀘스트 2개",
        }
    }

    pub fn accepts(&self, quests: &[Quest]) -> bool {
        let main = quests
            .iter()
            .filter(|q| q.kind == QuestKind::MainQuest)
            .count();
        let sub = quests.len() - main;
        let (main_min, main_max) = self.main_range();
        let (sub_min, sub_max) = self.sub_range();
        (main_min..=main_max).contains(&main) && (sub_min..=sub_max).contains(&sub)
    }
}

impl std::str::FromStr for QuestCountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "balanced" => Ok(Self::Balanced),
            _ => Err(format!("Unknown quest count policy: {s}")),
        }
    }
}
