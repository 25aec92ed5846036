use crate::db::{conversion_error, is_lock_violation};
use crate::errors::{AppError, AppResult};
use crate::models::month::MonthKey;
use crate::models::page::PageRequest;
use crate::models::worklog::{WorkLog, WorkLogFilter};
use crate::utils::date::format_date;
use crate::utils::time::format_time;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const WORKLOG_COLUMNS: &str = "id, project_id, user_id, work_date, start_time, end_time, \
                               duration_minutes, work_content, created_at, updated_at";

pub fn map_worklog(row: &Row) -> Result<WorkLog> {
    let date_str: String = row.get("work_date")?;
    let work_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(3, AppError::Validation(format!("bad work_date {date_str}"))))?;

    Ok(WorkLog {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        user_id: row.get("user_id")?,
        work_date,
        start_time: parse_stored_time(row, "start_time", 4)?,
        end_time: parse_stored_time(row, "end_time", 5)?,
        duration_minutes: row.get("duration_minutes")?,
        work_content: row.get("work_content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_stored_time(row: &Row, col: &str, idx: usize) -> Result<Option<NaiveTime>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
            .map(Some)
            .map_err(|_| conversion_error(idx, AppError::Validation(format!("bad {col} {s}")))),
    }
}

pub fn insert_worklog(conn: &Connection, wl: &WorkLog) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO worklogs (project_id, user_id, work_date, start_time, end_time,
                               duration_minutes, work_content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            wl.project_id,
            wl.user_id,
            format_date(&wl.work_date),
            wl.start_time.as_ref().map(format_time),
            wl.end_time.as_ref().map(format_time),
            wl.duration_minutes,
            wl.work_content,
            wl.created_at,
            wl.updated_at,
        ],
    )
    .map_err(|e| lock_error(e, wl))?;
    Ok(conn.last_insert_rowid())
}

/// Update a worklog (all fields except id, owner and created_at)
pub fn update_worklog(conn: &Connection, wl: &WorkLog) -> AppResult<()> {
    conn.execute(
        "UPDATE worklogs
         SET project_id = ?1, work_date = ?2, start_time = ?3, end_time = ?4,
             duration_minutes = ?5, work_content = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            wl.project_id,
            format_date(&wl.work_date),
            wl.start_time.as_ref().map(format_time),
            wl.end_time.as_ref().map(format_time),
            wl.duration_minutes,
            wl.work_content,
            wl.updated_at,
            wl.id,
        ],
    )
    .map_err(|e| lock_error(e, wl))?;
    Ok(())
}

pub fn delete_worklog(conn: &Connection, wl: &WorkLog) -> AppResult<()> {
    conn.execute("DELETE FROM worklogs WHERE id = ?1", [wl.id])
        .map_err(|e| lock_error(e, wl))?;
    Ok(())
}

fn lock_error(e: rusqlite::Error, wl: &WorkLog) -> AppError {
    if is_lock_violation(&e) {
        AppError::LockedPeriod(wl.month().to_string())
    } else {
        AppError::from(e)
    }
}

pub fn find_worklog(conn: &Connection, id: i64) -> AppResult<Option<WorkLog>> {
    let sql = format!("SELECT {WORKLOG_COLUMNS} FROM worklogs WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_worklog).optional()?)
}

fn collect(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> AppResult<Vec<WorkLog>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, map_worklog)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// All logs whose work_date falls in `month`, both boundary days included.
pub fn list_by_month(conn: &Connection, month: &MonthKey) -> AppResult<Vec<WorkLog>> {
    let sql = format!(
        "SELECT {WORKLOG_COLUMNS} FROM worklogs
         WHERE work_date BETWEEN ?1 AND ?2
         ORDER BY work_date ASC, id ASC"
    );
    let first = format_date(&month.first_day());
    let last = format_date(&month.last_day());
    collect(conn, &sql, params![first, last])
}

pub fn list_by_project(conn: &Connection, project_id: i64) -> AppResult<Vec<WorkLog>> {
    let sql = format!(
        "SELECT {WORKLOG_COLUMNS} FROM worklogs
         WHERE project_id = ?1
         ORDER BY work_date ASC, id ASC"
    );
    collect(conn, &sql, params![project_id])
}

/// Filtered, paginated listing, newest first. Returns (rows, total).
pub fn list_filtered(
    conn: &Connection,
    filter: &WorkLogFilter,
    page: PageRequest,
) -> AppResult<(Vec<WorkLog>, i64)> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(p) = filter.project_id {
        args.push(Box::new(p));
        clauses.push(format!("project_id = ?{}", args.len()));
    }
    if let Some(u) = filter.user_id {
        args.push(Box::new(u));
        clauses.push(format!("user_id = ?{}", args.len()));
    }
    if let Some(d) = filter.work_date {
        args.push(Box::new(format_date(&d)));
        clauses.push(format!("work_date = ?{}", args.len()));
    }
    if let Some(m) = filter.month {
        args.push(Box::new(format_date(&m.first_day())));
        args.push(Box::new(format_date(&m.last_day())));
        clauses.push(format!("work_date BETWEEN ?{} AND ?{}", args.len() - 1, args.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let refs: Vec<&dyn ToSql> = args.iter().map(|b| b.as_ref()).collect();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM worklogs {where_sql}"),
        refs.as_slice(),
        |row| row.get(0),
    )?;

    let sql = format!(
        "SELECT {WORKLOG_COLUMNS} FROM worklogs {where_sql}
         ORDER BY work_date DESC, id DESC
         LIMIT {} OFFSET {}",
        page.per_page,
        page.offset()
    );
    let rows = collect(conn, &sql, &refs)?;

    Ok((rows, total))
}
