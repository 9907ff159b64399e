use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{QuestlogError, Result};
use crate::llm::prompts::{ANALYSIS_MARKER, QUESTIONS_MARKER};
use crate::llm::{GenerationOptions, GenerativeModel, StructuredOutput};
use crate::models::QuestCountPolicy;

use super::types::{
    AnalysisResult, ParseOutcome, ParsedAnalysis, QuestionsResult, QuestsResult,
};

pub const REFLECTION_QUESTION_COUNT: usize = 5;

/// Returned by the reflection pipeline whenever any stage fails.
pub const FALLBACK_QUESTIONS: [&str; REFLECTION_QUESTION_COUNT] = [
    "오늘 하루 동안 가장 강하게 느낀 감정은 무엇이었나요? 그 감정이 들었던 이유는 무엇일까요?",
    "오늘의 경험 중에서 자신에 대해 새롭게 알게 된 점이 있다면 무엇인가요?",
    "오늘 했던 선택들 중에서 다르게 할 수 있었던 것이 있었나요?",
    "오늘 하루를 통해 자신의 어떤 가치관이나 신념이 확인되었나요?",
    "내일의 자신에게 해주고 싶은 이야기가 있다면 무엇인가요?",
];

pub fn fallback_questions() -> QuestionsResult {
    QuestionsResult {
        questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    }
}

fn numbered_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.").expect("numbered-line pattern compiles"))
}

/// Split free-text reasoner output into analysis and draft questions.
///
/// Everything before the questions marker (minus the analysis marker) is the
/// analysis. After it, every line with a number-dot prefix contributes the
/// text following its first dot. Output without the questions marker is
/// kept whole as the analysis with no questions and a degraded outcome.
pub fn parse_analysis(raw: &str) -> ParsedAnalysis {
    let Some((head, tail)) = raw.split_once(QUESTIONS_MARKER) else {
        tracing::warn!(
            response_len = raw.len(),
            response_preview = %raw.chars().take(100).collect::<String>(),
            "Reasoner output has no questions section, keeping it as analysis only"
        );
        return ParsedAnalysis {
            result: AnalysisResult {
                analysis: raw.trim().to_string(),
                questions: Vec::new(),
            },
            outcome: ParseOutcome::Degraded,
        };
    };

    let analysis = head.replace(ANALYSIS_MARKER, "").trim().to_string();

    let questions = tail
        .lines()
        .map(str::trim)
        .filter(|line| numbered_line().is_match(line))
        .filter_map(|line| line.split_once('.').map(|(_, rest)| rest.trim()))
        .filter(|question| !question.is_empty())
        .map(str::to_string)
        .collect();

    ParsedAnalysis {
        result: AnalysisResult {
            analysis,
            questions,
        },
        outcome: ParseOutcome::Complete,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Coerce schema-constrained output into `T`.
///
/// A JSON value is deserialized directly; a JSON-encoded string is decoded
/// exactly once. Any mismatch is a hard parse error.
pub fn parse_structured<T: DeserializeOwned>(value: Value) -> Result<T> {
    match value {
        Value::String(text) => serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            QuestlogError::Parse(format!("Failed to decode structured response: {e}"))
        }),
        other => serde_json::from_value(other).map_err(|e| {
            QuestlogError::Parse(format!("Structured response does not match schema: {e}"))
        }),
    }
}

/// Schema-constrained call for `T`. The raw value still has to go through
/// [`parse_structured`].
pub async fn request_structured<T: StructuredOutput>(
    model: &dyn GenerativeModel,
    prompt: &str,
    system_prompt: Option<&str>,
    options: &GenerationOptions,
) -> Result<Value> {
    model
        .complete_json(prompt, system_prompt, &T::json_schema(), options)
        .await
}

/// Require exactly five non-empty questions, trimming each one.
pub fn validate_questions(result: QuestionsResult) -> Result<QuestionsResult> {
    let questions: Vec<String> = result
        .questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .collect();

    if questions.len() != REFLECTION_QUESTION_COUNT {
        return Err(QuestlogError::Parse(format!(
            "Expected {REFLECTION_QUESTION_COUNT} questions, got {}",
            questions.len()
        )));
    }
    if questions.iter().any(|q| q.is_empty()) {
        return Err(QuestlogError::Parse("Received an empty question".to_string()));
    }

    Ok(QuestionsResult { questions })
}

/// Require a non-empty batch of titled quests. A batch outside the count
/// policy is kept and logged.
pub fn validate_quests(result: QuestsResult, policy: QuestCountPolicy) -> Result<QuestsResult> {
    if result.quests.is_empty() {
        return Err(QuestlogError::Parse(
            "Structured response contained no quests".to_string(),
        ));
    }
    if result.quests.iter().any(|q| q.title.trim().is_empty()) {
        return Err(QuestlogError::Parse(
            "Structured response contained a quest without a title".to_string(),
        ));
    }

    if !policy.accepts(&result.quests) {
        tracing::warn!(
            policy = ?policy,
            quest_count = result.quests.len(),
            "Quest batch does not match the requested count policy"
        );
    }

    Ok(result)
}
