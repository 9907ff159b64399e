use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::error::{QuestlogError, Result};
use crate::intelligence::{DailyInsight, QuestionsResult};
use crate::models::{
    ActivityLog, CharacterProfile, DatabaseIds, DatabaseKind, Quest, QuestKind, QuestRecord,
    QuestStatus, TimelineEntry,
};
use crate::store::{PageRef, WorkspaceStore};

use super::blocks::{
    self, block_text, date_property, number_property, page_title, property_number, property_text,
    select_property, text_property, title_property,
};
use super::client::{page_url, DatabaseQuery, NotionClient, Page};
use super::timeline::{entries_from_blocks, sort_activities, timeline_blocks};

const QUESTIONS_HEADING: &str = "🤔 오늘의 성찰 질문";
const QUESTIONS_INTRO: &str = "일기를 바탕으로 생성된 질문들입니다. 천천히 생각하며 답변해보세요.";
const INSIGHT_HEADING: &str = "📊 오늘의 리포트";

/// Kinds of page kept in the diary database, stored in its `Type` select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiaryPage {
    Timeline,
    Journal,
    Questions,
    Insight,
}

impl DiaryPage {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Timeline => "Timeline",
            Self::Journal => "Journal",
            Self::Questions => "Questions",
            Self::Insight => "Insight",
        }
    }

    fn title(&self, date: NaiveDate) -> String {
        let suffix = match self {
            Self::Timeline => "타임라인",
            Self::Journal => "일기",
            Self::Questions => "성찰 질문",
            Self::Insight => "일일 리포트",
        };
        format!("{} {suffix}", format_date(date))
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn page_ref(page: &Page) -> PageRef {
    PageRef {
        id: page.id.clone(),
        url: page_url(page),
    }
}

/// A user's workspace, accessed with their own integration token.
#[derive(Clone)]
pub struct NotionWorkspace {
    client: NotionClient,
}

impl NotionWorkspace {
    pub fn new(client: NotionClient) -> Self {
        Self { client }
    }

    async fn find_diary_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        page: DiaryPage,
    ) -> Result<Option<Page>> {
        let query = DatabaseQuery::filtered(json!({
            "and": [
                {"property": "Date", "date": {"equals": format_date(date)}},
                {"property": "Type", "select": {"equals": page.type_name()}}
            ]
        }))
        .limit(1);
        Ok(self.client.query_database(db_id, &query).await?.into_iter().next())
    }

    async fn create_diary_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        page: DiaryPage,
        children: Vec<Value>,
    ) -> Result<Page> {
        let properties = json!({
            "Title": title_property(&page.title(date)),
            "Date": date_property(&format_date(date)),
            "Type": select_property(page.type_name()),
        });
        self.client.create_page(db_id, properties, children).await
    }

    fn character_properties(profile: &CharacterProfile) -> Value {
        json!({
            "MBTI": text_property(profile.personality_type.as_deref().unwrap_or_default()),
            "Goals": text_property(profile.goals.as_deref().unwrap_or_default()),
            "Preferences": text_property(profile.preferences.as_deref().unwrap_or_default()),
        })
    }
}

fn character_from_page(page: &Page) -> CharacterProfile {
    let properties = &page.properties;
    CharacterProfile {
        name: property_text(properties, "Name")
            .or_else(|| page_title(page))
            .unwrap_or_default(),
        personality_type: property_text(properties, "MBTI"),
        goals: property_text(properties, "Goals"),
        preferences: property_text(properties, "Preferences"),
    }
}

fn quest_from_page(page: &Page) -> QuestRecord {
    let properties = &page.properties;
    let status = match property_text(properties, "Status").as_deref() {
        Some("Completed") => QuestStatus::Completed,
        _ => QuestStatus::Active,
    };
    QuestRecord {
        id: page.id.clone(),
        title: property_text(properties, "Name")
            .or_else(|| page_title(page))
            .unwrap_or_default(),
        kind: property_text(properties, "Type").and_then(|kind| kind.parse::<QuestKind>().ok()),
        description: property_text(properties, "Description").unwrap_or_default(),
        status,
    }
}

fn activity_from_page(page: &Page) -> ActivityLog {
    let properties = &page.properties;
    ActivityLog {
        title: property_text(properties, "Name")
            .or_else(|| page_title(page))
            .unwrap_or_default(),
        start_time: property_text(properties, "Start Time").unwrap_or_default(),
        end_time: property_text(properties, "End Time").unwrap_or_default(),
        duration_minutes: property_number(properties, "Duration"),
        thoughts: property_text(properties, "Thoughts"),
    }
}

fn questions_blocks(questions: &QuestionsResult) -> Vec<Value> {
    let mut content = vec![
        blocks::heading_1(QUESTIONS_HEADING),
        blocks::callout(QUESTIONS_INTRO, "✨"),
        blocks::divider(),
    ];
    for (idx, question) in questions.questions.iter().enumerate() {
        content.push(blocks::heading_3(&format!("Q{}.", idx + 1)));
        content.push(blocks::paragraph(question));
        content.push(blocks::divider());
    }
    content
}

fn insight_blocks(insight: &DailyInsight) -> Vec<Value> {
    let mut content = vec![
        blocks::heading_1(INSIGHT_HEADING),
        blocks::paragraph(&insight.summary),
    ];

    let sections = [
        ("🔁 행동 패턴", &insight.patterns),
        ("💡 통찰", &insight.insights),
        ("🎯 내일을 위한 제안", &insight.suggestions),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        content.push(blocks::divider());
        content.push(blocks::heading_2(heading));
        content.extend(items.iter().map(|item| blocks::bulleted_item(item)));
    }
    content
}

#[async_trait]
impl WorkspaceStore for NotionWorkspace {
    async fn find_databases(&self, page_id: &str) -> Result<DatabaseIds> {
        let children = self.client.list_block_children(page_id).await?;
        let mut ids = DatabaseIds::default();

        for block in children.iter().filter(|b| b.kind == "child_database") {
            let title = block
                .payload()
                .and_then(|payload| payload.get("title"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            match DatabaseKind::from_title(title) {
                Some(kind) => {
                    tracing::debug!(title, kind = kind.name(), id = %block.id, "Found workspace database");
                    ids.set_if_absent(kind, block.id.clone());
                }
                None => tracing::debug!(title, "Ignoring unrelated database"),
            }
        }

        Ok(ids)
    }

    async fn save_character(&self, db_id: &str, profile: &CharacterProfile) -> Result<String> {
        let mut properties = Self::character_properties(profile);
        properties["Name"] = title_property(&profile.name);
        let page = self.client.create_page(db_id, properties, Vec::new()).await?;
        Ok(page.id)
    }

    async fn get_character(&self, db_id: &str) -> Result<Option<CharacterProfile>> {
        let query = DatabaseQuery::default()
            .sorted_by(json!({"timestamp": "created_time", "direction": "descending"}))
            .limit(1);
        let pages = self.client.query_database(db_id, &query).await?;
        Ok(pages.first().map(character_from_page))
    }

    async fn update_character(&self, db_id: &str, profile: &CharacterProfile) -> Result<()> {
        let query = DatabaseQuery::filtered(json!({
            "property": "Name",
            "title": {"equals": profile.name}
        }))
        .limit(1);
        let page = self
            .client
            .query_database(db_id, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| QuestlogError::NotFound(format!("Character {} not found", profile.name)))?;

        self.client
            .update_page(&page.id, Self::character_properties(profile))
            .await?;
        Ok(())
    }

    async fn save_quest(&self, db_id: &str, quest: &Quest) -> Result<String> {
        let properties = json!({
            "Name": title_property(&quest.title),
            "Type": select_property(quest.kind.label()),
            "Description": text_property(&quest.description),
            "Status": select_property(QuestStatus::Active.label()),
        });
        let page = self.client.create_page(db_id, properties, Vec::new()).await?;
        tracing::debug!(quest = %quest.title, page_id = %page.id, "Saved quest");
        Ok(page.id)
    }

    async fn get_active_quests(&self, db_id: &str) -> Result<Vec<QuestRecord>> {
        let query = DatabaseQuery::filtered(json!({
            "property": "Status",
            "select": {"equals": QuestStatus::Active.label()}
        }));
        let pages = self.client.query_database(db_id, &query).await?;
        Ok(pages.iter().map(quest_from_page).collect())
    }

    async fn complete_quest(&self, quest_id: &str) -> Result<()> {
        let properties = json!({"Status": select_property(QuestStatus::Completed.label())});
        self.client.update_page(quest_id, properties).await?;
        Ok(())
    }

    async fn save_activity_log(
        &self,
        db_id: &str,
        date: NaiveDate,
        log: &ActivityLog,
    ) -> Result<String> {
        let mut properties = Map::new();
        properties.insert("Name".to_string(), title_property(&log.title));
        properties.insert("Date".to_string(), date_property(&format_date(date)));
        properties.insert("Start Time".to_string(), text_property(&log.start_time));
        properties.insert("End Time".to_string(), text_property(&log.end_time));
        if let Some(duration) = log.duration_minutes {
            properties.insert("Duration".to_string(), number_property(duration));
        }
        if let Some(thoughts) = &log.thoughts {
            properties.insert("Thoughts".to_string(), text_property(thoughts));
        }

        let page = self
            .client
            .create_page(db_id, Value::Object(properties), Vec::new())
            .await?;
        Ok(page.id)
    }

    async fn get_daily_activities(&self, db_id: &str, date: NaiveDate) -> Result<Vec<ActivityLog>> {
        let query = DatabaseQuery::filtered(json!({
            "property": "Date",
            "date": {"equals": format_date(date)}
        }));
        let pages = self.client.query_database(db_id, &query).await?;
        let activities: Vec<ActivityLog> = pages.iter().map(activity_from_page).collect();
        Ok(sort_activities(&activities))
    }

    async fn create_timeline_pages(
        &self,
        db_id: &str,
        date: NaiveDate,
        activities: &[ActivityLog],
    ) -> Result<PageRef> {
        let timeline = self
            .create_diary_page(db_id, date, DiaryPage::Timeline, timeline_blocks(activities))
            .await?;

        if self
            .find_diary_page(db_id, date, DiaryPage::Journal)
            .await?
            .is_none()
        {
            self.create_diary_page(db_id, date, DiaryPage::Journal, Vec::new())
                .await?;
        } else {
            tracing::debug!(date = %date, "Journal page already exists");
        }

        Ok(page_ref(&timeline))
    }

    async fn get_journal(&self, db_id: &str, date: NaiveDate) -> Result<Option<String>> {
        let Some(page) = self.find_diary_page(db_id, date, DiaryPage::Journal).await? else {
            return Ok(None);
        };

        let children = self.client.list_block_children(&page.id).await?;
        let lines: Vec<String> = children
            .iter()
            .filter(|b| matches!(b.kind.as_str(), "paragraph" | "quote") && !b.has_children)
            .filter_map(block_text)
            .filter(|text| !text.trim().is_empty())
            .collect();

        Ok(Some(lines.join("\n")))
    }

    async fn get_timeline(&self, db_id: &str, date: NaiveDate) -> Result<Vec<TimelineEntry>> {
        let Some(page) = self.find_diary_page(db_id, date, DiaryPage::Timeline).await? else {
            return Ok(Vec::new());
        };
        let children = self.client.list_block_children(&page.id).await?;
        Ok(entries_from_blocks(&children))
    }

    async fn create_questions_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        questions: &QuestionsResult,
    ) -> Result<PageRef> {
        let page = self
            .create_diary_page(db_id, date, DiaryPage::Questions, questions_blocks(questions))
            .await?;
        Ok(page_ref(&page))
    }

    async fn create_insight_page(
        &self,
        db_id: &str,
        date: NaiveDate,
        insight: &DailyInsight,
    ) -> Result<PageRef> {
        let page = self
            .create_diary_page(db_id, date, DiaryPage::Insight, insight_blocks(insight))
            .await?;
        Ok(page_ref(&page))
    }
}
