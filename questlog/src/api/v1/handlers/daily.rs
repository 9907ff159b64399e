//! v1 Daily diary handlers.
//!
//! Each endpoint takes an optional `{"date": "YYYY-MM-DD"}` body and
//! defaults to today.

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;

use crate::api::v1::dto::common::parse_date;
use crate::api::v1::dto::{DailyRequest, InsightResponse, ReflectionResponse, WrapUpResponse};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::error::Result;

fn requested_date(body: Option<Json<DailyRequest>>) -> Result<NaiveDate> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    parse_date(req.date.as_deref())
}

/// `POST /api/v1/daily/{name}/wrap-up`
#[utoipa::path(
    post,
    path = "/api/v1/daily/{name}/wrap-up",
    tag = "daily",
    operation_id = "daily.wrapUp",
    params(("name" = String, Path, description = "Character name")),
    request_body(content = DailyRequest, description = "Optional target date"),
    responses(
        (status = 200, description = "Timeline written, or nothing to write", body = WrapUpResponse),
        (status = 400, description = "Invalid date", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError),
    )
)]
pub async fn wrap_up(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<DailyRequest>>,
) -> ApiResponse<WrapUpResponse> {
    let date = match requested_date(body) {
        Ok(d) => d,
        Err(e) => return e.into(),
    };

    match state.diary.wrap_up(&name, date).await {
        Ok(wrap) => ApiResponse::success(WrapUpResponse {
            date,
            activities: wrap.activities,
            page: wrap.page,
        }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/daily/{name}/reflection`
///
/// Always yields five questions; the fixed fallback set is used when the
/// pipeline fails.
#[utoipa::path(
    post,
    path = "/api/v1/daily/{name}/reflection",
    tag = "daily",
    operation_id = "daily.reflection",
    params(("name" = String, Path, description = "Character name")),
    request_body(content = DailyRequest, description = "Optional target date"),
    responses(
        (status = 201, description = "Questions page written", body = ReflectionResponse),
        (status = 400, description = "Invalid date or empty diary", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError),
    )
)]
pub async fn reflection(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<DailyRequest>>,
) -> ApiResponse<ReflectionResponse> {
    let date = match requested_date(body) {
        Ok(d) => d,
        Err(e) => return e.into(),
    };

    match state.diary.reflect(&name, date).await {
        Ok(reflection) => ApiResponse::created(ReflectionResponse::new(
            date,
            reflection.questions,
            reflection.page,
        )),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/daily/{name}/insight`
#[utoipa::path(
    post,
    path = "/api/v1/daily/{name}/insight",
    tag = "daily",
    operation_id = "daily.insight",
    params(("name" = String, Path, description = "Character name")),
    request_body(content = DailyRequest, description = "Optional target date"),
    responses(
        (status = 201, description = "Report page written", body = InsightResponse),
        (status = 400, description = "Invalid date or empty diary", body = ApiError),
        (status = 502, description = "LLM pipeline failed", body = ApiError),
    )
)]
pub async fn insight(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<DailyRequest>>,
) -> ApiResponse<InsightResponse> {
    let date = match requested_date(body) {
        Ok(d) => d,
        Err(e) => return e.into(),
    };

    match state.diary.insight(&name, date).await {
        Ok(insight) => ApiResponse::created(InsightResponse {
            date,
            insight: insight.insight,
            page: insight.page,
        }),
        Err(e) => e.into(),
    }
}
