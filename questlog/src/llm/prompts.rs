//! Prompt templates for the reflection, quest and daily-insight pipelines.
//!
//! Templates use plain `format!()` interpolation so identical inputs always
//! render byte-identical prompts. User free text is embedded verbatim.

use crate::error::{QuestlogError, Result};
use crate::intelligence::types::AnalysisResult;
use crate::models::{DiaryInput, QuestCountPolicy, UserContext};

pub const ANALYSIS_MARKER: &str = "[분석]";
pub const QUESTIONS_MARKER: &str = "[질문]";

const MISSING_INFO: &str = "정보 없음";
const EMPTY_DIARY: &str = "(작성된 내용 없음)";

pub const REFLECTION_FORMATTER_SYSTEM_PROMPT: &str = r#"분석과 질문을 정리하여 노션 페이지에 적합한 형식으로 변환합니다.

응답은 반드시 다음 JSON 형식으로만 출력해야 하며, 그 외의 설명이나 마크다운은 포함하지 않습니다:
{"questions": ["질문1", "질문2", "질문3", "질문4", "질문5"]}"#;

pub const QUEST_FORMATTER_SYSTEM_PROMPT: &str = r#"퀘스트 설계 메모를 게임 퀘스트 목록으로 변환합니다.

응답은 반드시 다음 JSON 형식으로만 출력해야 하며, 그 외의 설명이나 마크다운은 포함하지 않습니다:
{"quests": [{"title": "퀘스트 제목", "kind": "MainQuest", "description": "설명과 보상"}]}"#;

pub const INSIGHT_FORMATTER_SYSTEM_PROMPT: &str = r#"하루 활동 분석을 일일 리포트로 정리합니다.

응답은 반드시 다음 JSON 형식으로만 출력해야 하며, 그 외의 설명이나 마크다운은 포함하지 않습니다:
{"summary": "요약", "patterns": ["패턴"], "insights": ["통찰"], "suggestions": ["제안"]}"#;

fn personality_code(ctx: &UserContext) -> Result<&str> {
    if ctx.personality_type.trim().is_empty() {
        return Err(QuestlogError::Validation(
            "Personality type code is required (use \"unknown\" when not set)".to_string(),
        ));
    }
    Ok(&ctx.personality_type)
}

fn or_missing(value: Option<&str>) -> &str {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(MISSING_INFO)
}

fn user_profile_block(ctx: &UserContext) -> Result<String> {
    let code = personality_code(ctx)?;
    let goals = or_missing(ctx.goals.as_deref());
    let preferences = or_missing(ctx.preferences.as_deref());
    Ok(format!(
        "사용자 정보:\n- MBTI: {code}\n- 목표: {goals}\n- 선호도: {preferences}"
    ))
}

/// Render the diary as prompt text: the activity timeline first (when
/// present), then the journal body.
fn diary_block(diary: &DiaryInput) -> String {
    let mut sections = Vec::new();

    let timeline = diary.timeline();
    if !timeline.is_empty() {
        let lines = timeline
            .iter()
            .map(|entry| match &entry.thoughts {
                Some(thoughts) if !thoughts.trim().is_empty() => {
                    format!("- {} {}\n  💭 {}", entry.time, entry.activity, thoughts)
                }
                _ => format!("- {} {}", entry.time, entry.activity),
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("활동 타임라인:\n{lines}"));
    }

    let journal = diary.journal();
    let journal = if journal.trim().is_empty() {
        EMPTY_DIARY
    } else {
        journal
    };
    sections.push(format!("일기 내용:\n{journal}"));

    sections.join("\n\n")
}

/// Generate the reasoner prompt for diary analysis and draft questions.
///
/// The response is requested in two labeled sections, `[분석]` and `[질문]`,
/// with a numbered list of 7-8 questions under the latter.
///
/// # Errors
/// Returns a validation error when the personality-type code is blank.
pub fn reflection_analysis_prompt(ctx: &UserContext, diary: &DiaryInput) -> Result<String> {
    let profile = user_profile_block(ctx)?;
    let diary = diary_block(diary);

    Ok(format!(
        r#"당신은 사용자의 MBTI, 목표, 선호도를 고려하여 일기를 분석하고 의미 있는 자기성찰 질문을 생성하는 전문가입니다.
일기에서 드러나는 사고방식, 행동 패턴, 감정의 흐름을 파악하고, 사용자의 성장을 돕는 통찰력 있는 질문을 제시해주세요.

{profile}

분석과 질문 생성 시 다음 사항을 고려해주세요:
1. MBTI 성향과의 연관성
2. 감정과 사고의 패턴
3. 행동과 결정의 동기
4. 현재 상황과 장기 목표와의 관계
5. 선호하는 학습/행동 방식과의 연관성
6. 잠재적 고정관념이나 편향
7. 성장 가능성과 개선점

분석과 질문을 다음과 같은 형식으로 작성해주세요:

{ANALYSIS_MARKER}
여기에 2-3문단의 분석을 작성해주세요.

{QUESTIONS_MARKER}
1. 첫 번째 질문
2. 두 번째 질문
...
(7-8개의 질문 작성)

{diary}"#
    ))
}

/// Generate the formatter prompt that condenses an analysis into exactly
/// five questions.
pub fn reflection_refine_prompt(analysis: &AnalysisResult) -> String {
    let questions = if analysis.questions.is_empty() {
        "(생성된 질문 없음)".to_string()
    } else {
        analysis
            .questions
            .iter()
            .enumerate()
            .map(|(idx, question)| format!("{}. {question}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"다음 분석과 질문들을 정확히 5개의 명확하고 통찰력 있는 질문으로 정리해주세요.

분석 내용:
{}

생성된 질문들:
{questions}"#,
        analysis.analysis
    )
}

/// Generate the reasoner prompt that drafts a quest plan.
///
/// # Arguments
/// * `ctx` - Personality code, goals and preferences of the user
/// * `policy` - How many main and sub quests to ask for
///
/// # Errors
/// Returns a validation error when the personality-type code is blank.
pub fn quest_reasoning_prompt(ctx: &UserContext, policy: QuestCountPolicy) -> Result<String> {
    let profile = user_profile_block(ctx)?;
    let count = policy.describe();

    Ok(format!(
        r#"당신은 사용자의 삶을 게임처럼 설계하는 퀘스트 디자이너입니다.
사용자의 MBTI 성향, 목표, 선호도를 바탕으로 오늘 도전할 만한 퀘스트를 설계해주세요.

{profile}

퀘스트 설계 시 다음 사항을 고려해주세요:
1. 장기 목표에 실제로 다가가게 하는 행동인지
2. MBTI 성향에 맞는 동기 부여 방식인지
3. 선호하는 학습/행동 방식과 맞는지
4. 하루 안에 완료할 수 있는 구체적인 분량인지
5. 완료 여부를 스스로 판단할 수 있는 명확한 기준이 있는지

{count}를 설계하고, 각 퀘스트마다 제목, 종류(메인/서브), 설명, 완료 시 보상을 적어주세요.
메인 퀘스트는 목표와 직접 연결된 핵심 과제, 서브 퀘스트는 컨디션과 습관을 돕는 가벼운 과제입니다.
각 퀘스트를 설계한 이유도 함께 설명해주세요."#
    ))
}

/// Generate the formatter prompt that turns a quest plan into records.
pub fn quest_format_prompt(rationale: &str, policy: QuestCountPolicy) -> String {
    let count = policy.describe();

    format!(
        r#"다음 퀘스트 설계 메모를 {count}로 구성된 퀘스트 목록으로 변환해주세요.

규칙:
- kind 는 "MainQuest" 또는 "SubQuest" 중 하나입니다.
- description 에는 퀘스트 설명과 보상을 함께 적습니다.
- 설계 메모에 없는 퀘스트를 새로 만들지 않습니다.

퀘스트 설계 메모:
{rationale}"#
    )
}

/// Generate the reasoner prompt for a daily activity report.
///
/// # Errors
/// Returns a validation error when the personality-type code is blank.
pub fn daily_insight_reasoning_prompt(ctx: &UserContext, diary: &DiaryInput) -> Result<String> {
    let profile = user_profile_block(ctx)?;
    let diary = diary_block(diary);

    Ok(format!(
        r#"당신은 사용자의 하루를 돌아보고 성장 방향을 제안하는 코치입니다.
아래 활동 기록과 일기를 바탕으로 하루를 분석해주세요.

{profile}

다음 항목을 순서대로 작성해주세요:
1. 하루 요약 (2-3문장)
2. 반복되거나 눈에 띄는 행동 패턴
3. 목표와 선호도에 비추어 얻을 수 있는 통찰
4. 내일 시도해볼 만한 구체적인 제안

{diary}"#
    ))
}

/// Generate the formatter prompt that turns a daily analysis into a report.
pub fn daily_insight_format_prompt(analysis: &str) -> String {
    format!(
        r#"다음 하루 분석을 summary, patterns, insights, suggestions 네 항목으로 정리해주세요.
각 목록 항목은 한 문장으로 작성합니다.

하루 분석:
{analysis}"#
    )
}
