use crate::db::{conversion_error, is_unique_violation};
use crate::errors::{AppError, AppResult};
use crate::models::master::{MasterKind, MasterRecord, NewMasterRecord};
use crate::utils::date::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const MASTER_COLUMNS: &str = "id, kind, name, color, sort_order, is_active, start_date_trigger, \
                              completion_trigger, display_name, description, category, \
                              created_at, updated_at";

pub fn map_master(row: &Row) -> Result<MasterRecord> {
    let kind_str: String = row.get("kind")?;
    let kind = MasterKind::from_db_str(&kind_str).ok_or_else(|| {
        conversion_error(1, AppError::Validation(format!("Invalid master kind: {kind_str}")))
    })?;

    Ok(MasterRecord {
        id: row.get("id")?,
        kind,
        name: row.get("name")?,
        color: row.get("color")?,
        sort_order: row.get("sort_order")?,
        is_active: row.get::<_, i64>("is_active")? == 1,
        start_date_trigger: row.get::<_, i64>("start_date_trigger")? == 1,
        completion_trigger: row.get::<_, i64>("completion_trigger")? == 1,
        display_name: row.get("display_name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn duplicate_name(kind: MasterKind, name: &str) -> AppError {
    AppError::Conflict(format!("{kind} '{name}' already exists"))
}

pub fn insert_master(conn: &Connection, kind: MasterKind, rec: &NewMasterRecord) -> AppResult<i64> {
    let now = now_rfc3339();
    let name = rec.name.trim();
    conn.execute(
        "INSERT INTO master_records (kind, name, color, sort_order, is_active,
                                     start_date_trigger, completion_trigger,
                                     display_name, description, category,
                                     created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            kind.to_db_str(),
            name,
            rec.color,
            rec.sort_order,
            rec.is_active as i64,
            rec.start_date_trigger as i64,
            rec.completion_trigger as i64,
            rec.display_name,
            rec.description,
            rec.category,
            now,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_name(kind, name)
        } else {
            AppError::from(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn update_master(conn: &Connection, rec: &MasterRecord) -> AppResult<()> {
    conn.execute(
        "UPDATE master_records
         SET name = ?1, color = ?2, sort_order = ?3, is_active = ?4,
             start_date_trigger = ?5, completion_trigger = ?6,
             display_name = ?7, description = ?8, category = ?9, updated_at = ?10
         WHERE id = ?11",
        params![
            rec.name,
            rec.color,
            rec.sort_order,
            rec.is_active as i64,
            rec.start_date_trigger as i64,
            rec.completion_trigger as i64,
            rec.display_name,
            rec.description,
            rec.category,
            now_rfc3339(),
            rec.id,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_name(rec.kind, &rec.name)
        } else {
            AppError::from(e)
        }
    })?;
    Ok(())
}

pub fn find_master(conn: &Connection, id: i64) -> AppResult<Option<MasterRecord>> {
    let sql = format!("SELECT {MASTER_COLUMNS} FROM master_records WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_master).optional()?)
}

pub fn list_masters(
    conn: &Connection,
    kind: MasterKind,
    include_inactive: bool,
) -> AppResult<Vec<MasterRecord>> {
    let sql = format!(
        "SELECT {MASTER_COLUMNS} FROM master_records
         WHERE kind = ?1 AND (?2 = 1 OR is_active = 1)
         ORDER BY sort_order ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![kind.to_db_str(), include_inactive as i64], map_master)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_master_active(conn: &Connection, id: i64, active: bool) -> AppResult<()> {
    conn.execute(
        "UPDATE master_records SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active as i64, now_rfc3339(), id],
    )?;
    Ok(())
}

/// Number of projects referencing a master record, in any of its columns.
pub fn count_references(conn: &Connection, id: i64) -> AppResult<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM projects
         WHERE machine_series_id = ?1 OR inquiry_id = ?1
            OR work_category_id = ?1 OR progress_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    Ok(n)
}
