use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::llm::{JsonSchemaSpec, StructuredOutput};
use crate::models::Quest;

/// First-stage output: free-text analysis plus draft questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: String,
    /// Empty when the reasoner ignored the section layout.
    pub questions: Vec<String>,
}

/// Final reflection output. Always five non-empty questions once it leaves
/// the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionsResult {
    pub questions: Vec<String>,
}

/// Quest batch returned by the formatter.
///
/// Formatters sometimes return the bare array and sometimes wrap it in an
/// object, both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct QuestsResult {
    pub quests: Vec<Quest>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestsResultRepr {
    Array(Vec<Quest>),
    Wrapped {
        #[serde(alias = "items")]
        quests: Vec<Quest>,
    },
}

impl<'de> Deserialize<'de> for QuestsResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let quests = match QuestsResultRepr::deserialize(deserializer)? {
            QuestsResultRepr::Array(quests) => quests,
            QuestsResultRepr::Wrapped { quests } => quests,
        };
        Ok(Self { quests })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DailyInsight {
    pub summary: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Position reached in a two-provider run, reported when a run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    PromptBuilt,
    ProviderACalled,
    ProviderBCalled,
    ResultReady,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PromptBuilt => "prompt_built",
            Self::ProviderACalled => "provider_a_called",
            Self::ProviderBCalled => "provider_b_called",
            Self::ResultReady => "result_ready",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether loose analysis parsing found the expected section layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    Complete,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnalysis {
    pub result: AnalysisResult,
    pub outcome: ParseOutcome,
}

impl ParsedAnalysis {
    pub fn is_degraded(&self) -> bool {
        self.outcome == ParseOutcome::Degraded
    }
}

fn string_array() -> serde_json::Value {
    json!({"type": "array", "items": {"type": "string"}})
}

impl StructuredOutput for QuestionsResult {
    fn json_schema() -> JsonSchemaSpec {
        JsonSchemaSpec::new(
            "reflection_questions",
            json!({
                "type": "object",
                "properties": {"questions": string_array()},
                "required": ["questions"],
                "additionalProperties": false
            }),
        )
        .with_description("Exactly five self-reflection questions")
    }
}

impl StructuredOutput for QuestsResult {
    fn json_schema() -> JsonSchemaSpec {
        JsonSchemaSpec::new(
            "quests",
            json!({
                "type": "object",
                "properties": {
                    "quests": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": {"type": "string"},
                                "kind": {"type": "string", "enum": ["MainQuest", "SubQuest"]},
                                "description": {"type": "string"}
                            },
                            "required": ["title", "kind", "description"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["quests"],
                "additionalProperties": false
            }),
        )
        .with_description("Gamified quests built from the user's context")
    }
}

impl StructuredOutput for DailyInsight {
    fn json_schema() -> JsonSchemaSpec {
        JsonSchemaSpec::new(
            "daily_insight",
            json!({
                "type": "object",
                "properties": {
                    "summary": {"type": "string"},
                    "patterns": string_array(),
                    "insights": string_array(),
                    "suggestions": string_array()
                },
                "required": ["summary", "patterns", "insights", "suggestions"],
                "additionalProperties": false
            }),
        )
        .with_description("Daily activity report")
    }
}
