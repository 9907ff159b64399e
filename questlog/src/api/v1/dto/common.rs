//! Shared DTO helpers used across multiple v1 API endpoints.

use chrono::{Local, NaiveDate};

use crate::error::{QuestlogError, Result};

/// Wire format for dates: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an optional `YYYY-MM-DD` date, defaulting to today's local date.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
            QuestlogError::Validation(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
        }),
    }
}
