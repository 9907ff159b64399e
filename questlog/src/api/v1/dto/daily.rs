//! Daily diary request/response DTOs for the v1 API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::intelligence::{DailyInsight, QuestionsResult};
use crate::models::ActivityLog;
use crate::store::PageRef;

/// Optional body for the `/daily/{name}/*` endpoints.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct DailyRequest {
    /// Day to process (`YYYY-MM-DD`), defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct WrapUpResponse {
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub activities: Vec<ActivityLog>,
    /// Timeline page, absent when nothing was logged that day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageRef>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ReflectionResponse {
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub questions: Vec<String>,
    pub page: PageRef,
}

impl ReflectionResponse {
    pub fn new(date: NaiveDate, questions: QuestionsResult, page: PageRef) -> Self {
        Self {
            date,
            questions: questions.questions,
            page,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct InsightResponse {
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub insight: DailyInsight,
    pub page: PageRef,
}
