use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBucket {
    pub user_id: i64,
    pub username: String,
    pub total_minutes: i64,
    pub entry_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateBucket {
    pub work_date: NaiveDate,
    pub total_minutes: i64,
    pub entry_count: i64,
}

/// Estimate-vs-actual view of one project. Minutes throughout.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: i64,
    pub management_no: String,
    pub estimated_hours: i64,
    pub actual_hours: i64,
    pub remaining_hours: i64,
    pub by_user: Vec<UserBucket>,
    pub by_date: Vec<DateBucket>,
}
