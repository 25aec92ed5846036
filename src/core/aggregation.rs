//! Work-hour aggregation.
//!
//! The pure functions here reduce a set of work logs into per-project,
//! per-user and per-date totals; the `SummaryLogic` entry points load that
//! set inside a single read transaction so the filter and the sum see the
//! same snapshot.

use crate::db::pool::DbPool;
use crate::db::projects::{find_project, load_projects_by_ids};
use crate::db::users::list_users;
use crate::db::worklogs::{list_by_month, list_by_project};
use crate::errors::{AppError, AppResult};
use crate::models::invoice::{InvoicePreviewItem, MonthSummary};
use crate::models::month::MonthKey;
use crate::models::project::Project;
use crate::models::summary::{DateBucket, ProjectSummary, UserBucket};
use crate::models::worklog::WorkLog;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};

/// A preview row together with the project it bills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTotal {
    pub project_id: i64,
    pub item: InvoicePreviewItem,
}

fn add_minutes(acc: i64, minutes: i64) -> AppResult<i64> {
    acc.checked_add(minutes)
        .ok_or_else(|| AppError::Validation("minute total out of range".into()))
}

/// Sum minutes per project.
pub fn minutes_by_project(logs: &[WorkLog]) -> AppResult<BTreeMap<i64, i64>> {
    let mut totals = BTreeMap::new();
    for wl in logs {
        let total = totals.entry(wl.project_id).or_insert(0);
        *total = add_minutes(*total, wl.duration_minutes)?;
    }
    Ok(totals)
}

/// Join per-project totals to their projects and order them by
/// `management_no`, then project id.
///
/// A total whose project cannot be resolved fails the whole result:
/// invoice rows are never dropped silently.
pub fn build_items(
    totals: &BTreeMap<i64, i64>,
    projects: &HashMap<i64, Project>,
) -> AppResult<Vec<ProjectTotal>> {
    let mut rows = Vec::with_capacity(totals.len());

    for (&project_id, &minutes) in totals {
        if minutes == 0 {
            continue;
        }
        let project = projects
            .get(&project_id)
            .ok_or_else(|| AppError::NotFound(format!("project {project_id}")))?;

        rows.push(ProjectTotal {
            project_id,
            item: InvoicePreviewItem {
                management_no: project.management_no.clone(),
                machine_no: project.machine_no.clone().unwrap_or_default(),
                actual_hours: minutes,
            },
        });
    }

    rows.sort_by(|a, b| {
        a.item
            .management_no
            .cmp(&b.item.management_no)
            .then(a.project_id.cmp(&b.project_id))
    });
    Ok(rows)
}

pub fn to_summary(rows: Vec<ProjectTotal>) -> AppResult<MonthSummary> {
    let items: Vec<InvoicePreviewItem> = rows.into_iter().map(|r| r.item).collect();
    let total_hours = items
        .iter()
        .try_fold(0, |acc, i| add_minutes(acc, i.actual_hours))?;
    Ok(MonthSummary { total_hours, items })
}

/// Reduce a project's logs into user and date buckets.
///
/// Every log lands in exactly one user bucket and one date bucket.
/// Users are ordered by name, dates newest first.
pub fn summarize_project(
    project: &Project,
    logs: &[WorkLog],
    usernames: &HashMap<i64, String>,
) -> AppResult<ProjectSummary> {
    let mut by_user: HashMap<i64, (i64, i64)> = HashMap::new();
    let mut by_date: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

    for wl in logs {
        let u = by_user.entry(wl.user_id).or_insert((0, 0));
        u.0 = add_minutes(u.0, wl.duration_minutes)?;
        u.1 += 1;

        let d = by_date.entry(wl.work_date).or_insert((0, 0));
        d.0 = add_minutes(d.0, wl.duration_minutes)?;
        d.1 += 1;
    }

    let mut user_buckets = Vec::with_capacity(by_user.len());
    for (user_id, (total_minutes, entry_count)) in by_user {
        let username = usernames
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        user_buckets.push(UserBucket {
            user_id,
            username,
            total_minutes,
            entry_count,
        });
    }
    user_buckets.sort_by(|a, b| a.username.cmp(&b.username).then(a.user_id.cmp(&b.user_id)));

    let date_buckets: Vec<DateBucket> = by_date
        .into_iter()
        .rev()
        .map(|(work_date, (total_minutes, entry_count))| DateBucket {
            work_date,
            total_minutes,
            entry_count,
        })
        .collect();

    let estimated = project.estimated_hours.unwrap_or(0);
    let actual = logs
        .iter()
        .try_fold(0, |acc, wl| add_minutes(acc, wl.duration_minutes))?;
    let remaining = estimated
        .checked_sub(actual)
        .ok_or_else(|| AppError::Validation("remaining minutes out of range".into()))?;

    Ok(ProjectSummary {
        project_id: project.id,
        management_no: project.management_no.clone(),
        estimated_hours: estimated,
        actual_hours: actual,
        remaining_hours: remaining,
        by_user: user_buckets,
        by_date: date_buckets,
    })
}

/// Month rows on an open connection or transaction.
pub(crate) fn month_rows_in(conn: &Connection, month: &MonthKey) -> AppResult<Vec<ProjectTotal>> {
    let logs = list_by_month(conn, month)?;
    let totals = minutes_by_project(&logs)?;
    let ids: Vec<i64> = totals.keys().copied().collect();
    let projects = load_projects_by_ids(conn, &ids)?;
    build_items(&totals, &projects)
}

pub(crate) fn month_summary_in(conn: &Connection, month: &MonthKey) -> AppResult<MonthSummary> {
    to_summary(month_rows_in(conn, month)?)
}

pub struct SummaryLogic;

impl SummaryLogic {
    pub fn month_summary(pool: &mut DbPool, month: &MonthKey) -> AppResult<MonthSummary> {
        let tx = pool.read_tx()?;
        let summary = month_summary_in(&tx, month)?;
        tx.commit()?;
        Ok(summary)
    }

    pub fn project_summary(pool: &mut DbPool, project_id: i64) -> AppResult<ProjectSummary> {
        let tx = pool.read_tx()?;

        let project = find_project(&tx, project_id)?
            .ok_or_else(|| AppError::NotFound(format!("project {project_id}")))?;
        let logs = list_by_project(&tx, project_id)?;
        let usernames: HashMap<i64, String> = list_users(&tx)?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        tx.commit()?;
        summarize_project(&project, &logs, &usernames)
    }
}
