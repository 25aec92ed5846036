use crate::db::{conversion_error, is_unique_violation};
use crate::errors::{AppError, AppResult};
use crate::models::page::PageRequest;
use crate::models::project::{Project, ProjectFilter, ProjectView};
use crate::utils::date::format_date;
use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::collections::HashMap;

const PROJECT_COLUMNS: &str = "p.id, p.management_no, p.machine_no, p.machine_series_id, \
    p.generation, p.tonnage, p.spec_tags, p.commission_content, p.inquiry_id, \
    p.work_category_id, p.progress_id, p.estimated_hours, p.start_date, p.completion_date, \
    p.drawing_deadline, p.is_active, p.created_by, p.created_at, p.updated_at";

/// Columns of a project view: stored fields, derived minutes, master names.
const VIEW_SELECT: &str = "SELECT p.id, p.management_no, p.machine_no, p.machine_series_id, \
    p.generation, p.tonnage, p.spec_tags, p.commission_content, p.inquiry_id, \
    p.work_category_id, p.progress_id, p.estimated_hours, p.start_date, p.completion_date, \
    p.drawing_deadline, p.is_active, p.created_by, p.created_at, p.updated_at, \
    (SELECT COALESCE(SUM(w.duration_minutes), 0) FROM worklogs w WHERE w.project_id = p.id) AS actual_hours, \
    ms.name AS machine_series_name, iq.name AS inquiry_name, \
    wc.name AS work_category_name, pg.name AS progress_name \
    FROM projects p \
    LEFT JOIN master_records ms ON ms.id = p.machine_series_id \
    LEFT JOIN master_records iq ON iq.id = p.inquiry_id \
    LEFT JOIN master_records wc ON wc.id = p.work_category_id \
    LEFT JOIN master_records pg ON pg.id = p.progress_id";

fn parse_opt_date(row: &Row, col: &str, idx: usize) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| conversion_error(idx, AppError::Validation(format!("bad {col} {s}")))),
    }
}

pub fn map_project(row: &Row) -> Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        management_no: row.get("management_no")?,
        machine_no: row.get("machine_no")?,
        machine_series_id: row.get("machine_series_id")?,
        generation: row.get("generation")?,
        tonnage: row.get("tonnage")?,
        spec_tags: row.get("spec_tags")?,
        commission_content: row.get("commission_content")?,
        inquiry_id: row.get("inquiry_id")?,
        work_category_id: row.get("work_category_id")?,
        progress_id: row.get("progress_id")?,
        estimated_hours: row.get("estimated_hours")?,
        start_date: parse_opt_date(row, "start_date", 12)?,
        completion_date: parse_opt_date(row, "completion_date", 13)?,
        drawing_deadline: parse_opt_date(row, "drawing_deadline", 14)?,
        is_active: row.get::<_, i64>("is_active")? == 1,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn map_project_view(row: &Row) -> Result<ProjectView> {
    Ok(ProjectView {
        project: map_project(row)?,
        actual_hours: row.get("actual_hours")?,
        machine_series_name: row.get("machine_series_name")?,
        inquiry_name: row.get("inquiry_name")?,
        work_category_name: row.get("work_category_name")?,
        progress_name: row.get("progress_name")?,
    })
}

fn map_write_error(e: rusqlite::Error, management_no: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict(format!("management_no '{management_no}' is already in use"))
    } else {
        AppError::from(e)
    }
}

pub fn insert_project(conn: &Connection, p: &Project) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO projects (management_no, machine_no, machine_series_id, generation,
                               tonnage, spec_tags, commission_content, inquiry_id,
                               work_category_id, progress_id, estimated_hours, start_date,
                               completion_date, drawing_deadline, is_active, created_by,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            p.management_no,
            p.machine_no,
            p.machine_series_id,
            p.generation,
            p.tonnage,
            p.spec_tags,
            p.commission_content,
            p.inquiry_id,
            p.work_category_id,
            p.progress_id,
            p.estimated_hours,
            p.start_date.as_ref().map(format_date),
            p.completion_date.as_ref().map(format_date),
            p.drawing_deadline.as_ref().map(format_date),
            p.is_active as i64,
            p.created_by,
            p.created_at,
            p.updated_at,
        ],
    )
    .map_err(|e| map_write_error(e, &p.management_no))?;
    Ok(conn.last_insert_rowid())
}

pub fn update_project(conn: &Connection, p: &Project) -> AppResult<()> {
    conn.execute(
        "UPDATE projects
         SET management_no = ?1, machine_no = ?2, machine_series_id = ?3, generation = ?4,
             tonnage = ?5, spec_tags = ?6, commission_content = ?7, inquiry_id = ?8,
             work_category_id = ?9, progress_id = ?10, estimated_hours = ?11,
             start_date = ?12, completion_date = ?13, drawing_deadline = ?14,
             is_active = ?15, updated_at = ?16
         WHERE id = ?17",
        params![
            p.management_no,
            p.machine_no,
            p.machine_series_id,
            p.generation,
            p.tonnage,
            p.spec_tags,
            p.commission_content,
            p.inquiry_id,
            p.work_category_id,
            p.progress_id,
            p.estimated_hours,
            p.start_date.as_ref().map(format_date),
            p.completion_date.as_ref().map(format_date),
            p.drawing_deadline.as_ref().map(format_date),
            p.is_active as i64,
            p.updated_at,
            p.id,
        ],
    )
    .map_err(|e| map_write_error(e, &p.management_no))?;
    Ok(())
}

pub fn find_project(conn: &Connection, id: i64) -> AppResult<Option<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1");
    Ok(conn.query_row(&sql, [id], map_project).optional()?)
}

pub fn find_project_view(conn: &Connection, id: i64) -> AppResult<Option<ProjectView>> {
    let sql = format!("{VIEW_SELECT} WHERE p.id = ?1");
    Ok(conn.query_row(&sql, [id], map_project_view).optional()?)
}

/// Projects by id, for joining aggregated rows. Inactive projects included:
/// a soft-deleted project still owns the hours logged against it.
pub fn load_projects_by_ids(conn: &Connection, ids: &[i64]) -> AppResult<HashMap<i64, Project>> {
    let mut out = HashMap::new();
    if ids.is_empty() {
        return Ok(out);
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id IN ({placeholders})");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), map_project)?;
    for r in rows {
        let p = r?;
        out.insert(p.id, p);
    }
    Ok(out)
}

/// Filtered, paginated listing, newest first. Returns (rows, total).
pub fn list_filtered(
    conn: &Connection,
    filter: &ProjectFilter,
    page: PageRequest,
) -> AppResult<(Vec<ProjectView>, i64)> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if !filter.include_inactive {
        clauses.push("p.is_active = 1".to_string());
    }
    if let Some(id) = filter.progress_id {
        args.push(Box::new(id));
        clauses.push(format!("p.progress_id = ?{}", args.len()));
    }
    if let Some(id) = filter.work_category_id {
        args.push(Box::new(id));
        clauses.push(format!("p.work_category_id = ?{}", args.len()));
    }
    if let Some(no) = filter.machine_no.as_deref().filter(|s| !s.is_empty()) {
        args.push(Box::new(format!("%{no}%")));
        clauses.push(format!("p.machine_no LIKE ?{}", args.len()));
    }
    if let Some(no) = filter.management_no.as_deref().filter(|s| !s.is_empty()) {
        args.push(Box::new(format!("%{no}%")));
        clauses.push(format!("p.management_no LIKE ?{}", args.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let refs: Vec<&dyn ToSql> = args.iter().map(|b| b.as_ref()).collect();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM projects p{where_sql}"),
        refs.as_slice(),
        |row| row.get(0),
    )?;

    let sql = format!(
        "{VIEW_SELECT}{where_sql} ORDER BY p.id DESC LIMIT {} OFFSET {}",
        page.per_page,
        page.offset()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(refs.as_slice(), map_project_view)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok((out, total))
}

pub fn find_project_by_management_no(
    conn: &Connection,
    management_no: &str,
) -> AppResult<Option<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.management_no = ?1");
    Ok(conn
        .query_row(&sql, [management_no.trim()], map_project)
        .optional()?)
}
