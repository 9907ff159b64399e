use chrono::NaiveDate;

use crate::error::{QuestlogError, Result};
use crate::intelligence::{DailyInsight, DailyInsightAnalyzer, QuestionsResult, ReflectionOrchestrator};
use crate::models::{ActivityLog, DatabaseKind, DiaryInput, UserContext};
use crate::store::PageRef;

use super::workspaces::{UserWorkspace, Workspaces};

/// Result of closing out a day.
#[derive(Debug, Clone)]
pub struct WrapUp {
    pub activities: Vec<ActivityLog>,
    /// `None` when nothing was logged that day.
    pub page: Option<PageRef>,
}

#[derive(Debug, Clone)]
pub struct Reflection {
    pub questions: QuestionsResult,
    pub page: PageRef,
}

#[derive(Debug, Clone)]
pub struct Insight {
    pub insight: DailyInsight,
    pub page: PageRef,
}

/// Daily diary flow: timeline wrap-up, reflection questions, daily report.
#[derive(Clone)]
pub struct DiaryService {
    workspaces: Workspaces,
    reflection: ReflectionOrchestrator,
    insight: DailyInsightAnalyzer,
}

impl DiaryService {
    pub fn new(
        workspaces: Workspaces,
        reflection: ReflectionOrchestrator,
        insight: DailyInsightAnalyzer,
    ) -> Self {
        Self {
            workspaces,
            reflection,
            insight,
        }
    }

    /// Turn the day's activity logs into the timeline and journal pages.
    pub async fn wrap_up(&self, name: &str, date: NaiveDate) -> Result<WrapUp> {
        let workspace = self.workspaces.open(name).await?;
        let activity_db = workspace.database(DatabaseKind::Activity)?;
        let diary_db = workspace.database(DatabaseKind::Diary)?;

        let activities = workspace
            .store
            .get_daily_activities(activity_db, date)
            .await?;
        if activities.is_empty() {
            tracing::debug!(user = name, %date, "No activities to wrap up");
            return Ok(WrapUp {
                activities,
                page: None,
            });
        }

        let page = workspace
            .store
            .create_timeline_pages(diary_db, date, &activities)
            .await?;
        tracing::info!(user = name, %date, count = activities.len(), "Wrote day timeline");
        Ok(WrapUp {
            activities,
            page: Some(page),
        })
    }

    /// Generate the day's reflection questions and write them to the diary.
    ///
    /// Question generation itself never fails; store errors still propagate.
    pub async fn reflect(&self, name: &str, date: NaiveDate) -> Result<Reflection> {
        let workspace = self.workspaces.open(name).await?;
        let diary_db = workspace.database(DatabaseKind::Diary)?;
        let (ctx, diary) = Self::load_day(&workspace, date).await?;

        let questions = self.reflection.generate_questions(&ctx, &diary).await;
        let page = workspace
            .store
            .create_questions_page(diary_db, date, &questions)
            .await?;
        Ok(Reflection { questions, page })
    }

    /// Run the daily insight pipeline and write the report page.
    pub async fn insight(&self, name: &str, date: NaiveDate) -> Result<Insight> {
        let workspace = self.workspaces.open(name).await?;
        let diary_db = workspace.database(DatabaseKind::Diary)?;
        let (ctx, diary) = Self::load_day(&workspace, date).await?;

        let insight = self.insight.analyze(&ctx, &diary).await?;
        let page = workspace
            .store
            .create_insight_page(diary_db, date, &insight)
            .await?;
        Ok(Insight { insight, page })
    }

    async fn load_day(workspace: &UserWorkspace, date: NaiveDate) -> Result<(UserContext, DiaryInput)> {
        let character_db = workspace.database(DatabaseKind::Character)?;
        let diary_db = workspace.database(DatabaseKind::Diary)?;

        let character = workspace
            .store
            .get_character(character_db)
            .await?
            .ok_or_else(|| {
                QuestlogError::NotFound(format!("No character found for {}", workspace.user.name))
            })?;

        let timeline = workspace.store.get_timeline(diary_db, date).await?;
        let journal = workspace.store.get_journal(diary_db, date).await?;
        let diary = DiaryInput::from_parts(timeline, journal);
        if diary.is_empty() {
            return Err(QuestlogError::Validation(format!(
                "Nothing recorded in the diary for {date}"
            )));
        }

        Ok((character.to_context(), diary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::intelligence::testing::ScriptedModel;
    use crate::intelligence::FALLBACK_QUESTIONS;
    use crate::models::{CharacterProfile, DatabaseIds, UserRecord};
    use crate::store::memory::{InMemoryAdmin, InMemoryWorkspace, StaticConnector};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn ids() -> DatabaseIds {
        DatabaseIds {
            character: Some("char-db".to_string()),
            activity: Some("activity-db".to_string()),
            quest: Some("quest-db".to_string()),
            diary: Some("diary-db".to_string()),
        }
    }

    fn workspace() -> Arc<InMemoryWorkspace> {
        let workspace = Arc::new(InMemoryWorkspace::with_databases(ids()));
        workspace.state.lock().unwrap().characters.push(CharacterProfile {
            name: "Hero".to_string(),
            personality_type: Some("ENFP".to_string()),
            goals: Some("write daily".to_string()),
            preferences: None,
        });
        workspace
    }

    fn service(
        workspace: Arc<InMemoryWorkspace>,
        reasoner: ScriptedModel,
        formatter: ScriptedModel,
    ) -> DiaryService {
        let admin = Arc::new(InMemoryAdmin::with_user(UserRecord {
            name: "Hero".to_string(),
            notion_api_key: Some("token".to_string()),
            notion_url: None,
            database_ids: ids(),
        }));
        let connector = Arc::new(StaticConnector::with("token", workspace));
        let reasoner: Arc<ScriptedModel> = Arc::new(reasoner);
        let formatter: Arc<ScriptedModel> = Arc::new(formatter);
        DiaryService::new(
            Workspaces::new(admin, connector),
            ReflectionOrchestrator::new(reasoner.clone(), formatter.clone()),
            DailyInsightAnalyzer::new(reasoner, formatter),
        )
    }

    fn log(title: &str, start: &str) -> ActivityLog {
        ActivityLog {
            title: title.to_string(),
            start_time: start.to_string(),
            end_time: "23:00".to_string(),
            duration_minutes: None,
            thoughts: None,
        }
    }

    #[tokio::test]
    async fn wrap_up_without_activities_writes_nothing() {
        let ws = workspace();
        let service = service(ws.clone(), ScriptedModel::text("x"), ScriptedModel::failing());

        let wrap = service.wrap_up("Hero", date()).await.unwrap();

        assert!(wrap.page.is_none());
        assert!(ws.state.lock().unwrap().timelines.is_empty());
    }

    #[tokio::test]
    async fn wrap_up_builds_timeline() {
        let ws = workspace();
        {
            let mut state = ws.state.lock().unwrap();
            state.activities.push((date(), log("Read", "09:00")));
            state.activities.push((date(), log("Run", "07:00")));
        }
        let service = service(ws.clone(), ScriptedModel::text("x"), ScriptedModel::failing());

        let wrap = service.wrap_up("Hero", date()).await.unwrap();

        assert_eq!(wrap.activities.len(), 2);
        assert!(wrap.page.is_some());
        assert_eq!(ws.state.lock().unwrap().timelines[&date()].len(), 2);
    }

    #[tokio::test]
    async fn reflect_falls_back_when_formatter_fails() {
        let ws = workspace();
        ws.state
            .lock()
            .unwrap()
            .journals
            .insert(date(), "오늘은 산책을 했다".to_string());
        let service = service(
            ws.clone(),
            ScriptedModel::text("[분석]\n좋은 하루\n[질문]\n1. 무엇을 느꼈나요?"),
            ScriptedModel::failing(),
        );

        let reflection = service.reflect("Hero", date()).await.unwrap();

        assert_eq!(reflection.questions.questions, FALLBACK_QUESTIONS.map(String::from).to_vec());
        assert_eq!(ws.state.lock().unwrap().questions.len(), 1);
    }

    #[tokio::test]
    async fn reflect_on_empty_day_is_rejected() {
        let service = service(workspace(), ScriptedModel::text("x"), ScriptedModel::failing());
        assert!(matches!(
            service.reflect("Hero", date()).await,
            Err(QuestlogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn insight_writes_report_page() {
        let ws = workspace();
        ws.state
            .lock()
            .unwrap()
            .journals
            .insert(date(), "집중이 잘 됐다".to_string());
        let service = service(
            ws.clone(),
            ScriptedModel::text("focused morning"),
            ScriptedModel::json(json!({
                "summary": "집중한 하루",
                "patterns": ["아침 집중"],
                "insights": [],
                "suggestions": ["내일도 일찍 시작"]
            })),
        );

        let insight = service.insight("Hero", date()).await.unwrap();

        assert_eq!(insight.insight.summary, "집중한 하루");
        assert_eq!(ws.state.lock().unwrap().insights.len(), 1);
    }

    #[tokio::test]
    async fn insight_failure_propagates() {
        let ws = workspace();
        ws.state
            .lock()
            .unwrap()
            .journals
            .insert(date(), "집중이 잘 됐다".to_string());
        let service = service(ws.clone(), ScriptedModel::failing(), ScriptedModel::failing());

        assert!(service.insight("Hero", date()).await.is_err());
        assert!(ws.state.lock().unwrap().insights.is_empty());
    }
}
