use serde::{Deserialize, Serialize};

/// Sentinel personality-type code for users who never set one.
pub const UNKNOWN_PERSONALITY_TYPE: &str = "unknown";

/// Per-call user context used to steer prompts.
///
/// `personality_type` is an opaque categorical code (typically a 4-letter
/// MBTI code) and is never truncated or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub personality_type: String,
    pub goals: Option<String>,
    pub preferences: Option<String>,
}

impl UserContext {
    pub fn new(
        personality_type: impl Into<String>,
        goals: Option<String>,
        preferences: Option<String>,
    ) -> Self {
        Self {
            personality_type: personality_type.into(),
            goals,
            preferences,
        }
    }
}

/// One activity slot of a day timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TimelineEntry {
    pub time: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<String>,
}

/// Diary content handed to the analysis prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiaryInput {
    Plain {
        text: String,
    },
    Structured {
        timeline: Vec<TimelineEntry>,
        journal: String,
    },
}

impl DiaryInput {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    /// Build the richest input available: structured when a timeline exists.
    pub fn from_parts(timeline: Vec<TimelineEntry>, journal: Option<String>) -> Self {
        let journal = journal.unwrap_or_default();
        if timeline.is_empty() {
            Self::Plain { text: journal }
        } else {
            Self::Structured { timeline, journal }
        }
    }

    pub fn journal(&self) -> &str {
        match self {
            Self::Plain { text } => text,
            Self::Structured { journal, .. } => journal,
        }
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        match self {
            Self::Plain { .. } => &[],
            Self::Structured { timeline, .. } => timeline,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.journal().trim().is_empty() && self.timeline().is_empty()
    }
}

/// A logged activity: a completed quest with its timer details and review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub title: String,
    /// `HH:MM` start of the activity.
    pub start_time: String,
    /// `HH:MM` end of the activity.
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<String>,
}

impl ActivityLog {
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}

impl From<&ActivityLog> for TimelineEntry {
    fn from(log: &ActivityLog) -> Self {
        Self {
            time: log.time_range(),
            activity: log.title.clone(),
            thoughts: log.thoughts.clone(),
        }
    }
}

/// Character row stored in the user's character database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub personality_type: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
}

impl CharacterProfile {
    /// Context for prompt building. Missing codes become the `unknown` sentinel.
    pub fn to_context(&self) -> UserContext {
        let personality_type = self
            .personality_type
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(UNKNOWN_PERSONALITY_TYPE);
        UserContext::new(
            personality_type,
            self.goals.clone(),
            self.preferences.clone(),
        )
    }
}
