use super::month::MonthKey;
use crate::errors::{AppError, AppResult};
use crate::utils::time::hhmm_opt;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct WorkLog {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub work_date: NaiveDate, // ⇔ worklogs.work_date (TEXT "YYYY-MM-DD")
    #[serde(with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>, // ⇔ worklogs.start_time (TEXT "HH:MM")
    #[serde(with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: i64,
    pub work_content: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkLog {
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.work_date)
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_duration(self.duration_minutes)?;
        validate_span(self.start_time, self.end_time)
    }
}

/// Request body for a new work log. The owner comes from the actor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkLog {
    pub project_id: i64,
    pub work_date: NaiveDate,
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub work_content: Option<String>,
}

impl NewWorkLog {
    pub fn validate(&self) -> AppResult<()> {
        validate_duration(self.duration_minutes)?;
        validate_span(self.start_time, self.end_time)
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkLogPatch {
    pub project_id: Option<i64>,
    pub work_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i64>,
    pub work_content: Option<String>,
}

impl WorkLogPatch {
    /// Produce the record as it would look after the patch.
    pub fn apply_to(&self, current: &WorkLog) -> WorkLog {
        let mut next = current.clone();
        if let Some(p) = self.project_id {
            next.project_id = p;
        }
        if let Some(d) = self.work_date {
            next.work_date = d;
        }
        if self.start_time.is_some() {
            next.start_time = self.start_time;
        }
        if self.end_time.is_some() {
            next.end_time = self.end_time;
        }
        if let Some(m) = self.duration_minutes {
            next.duration_minutes = m;
        }
        if self.work_content.is_some() {
            next.work_content = self.work_content.clone();
        }
        next
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkLogFilter {
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
    pub work_date: Option<NaiveDate>,
    pub month: Option<MonthKey>,
}

/// A single log covers at most one day.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

pub fn validate_duration(minutes: i64) -> AppResult<()> {
    if minutes < 1 {
        return Err(AppError::Validation(format!(
            "duration_minutes must be a positive integer, got {minutes}"
        )));
    }
    if minutes > MAX_DURATION_MINUTES {
        return Err(AppError::Validation(format!(
            "duration_minutes must be at most {MAX_DURATION_MINUTES}, got {minutes}"
        )));
    }
    Ok(())
}

pub fn validate_span(start: Option<NaiveTime>, end: Option<NaiveTime>) -> AppResult<()> {
    if let (Some(s), Some(e)) = (start, end)
        && e <= s
    {
        return Err(AppError::Validation(format!(
            "end_time {} must be after start_time {}",
            e.format("%H:%M"),
            s.format("%H:%M")
        )));
    }
    Ok(())
}
