use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::invoice::{InvoiceMonth, InvoiceMonthListing, InvoicePreviewItem, MonthState};
use crate::models::month::MonthKey;
use crate::utils::date::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const MONTH_COLUMNS: &str = "month, state, closed_at, closed_by, created_at";

pub fn map_invoice_month(row: &Row) -> Result<InvoiceMonth> {
    let month_str: String = row.get("month")?;
    let month = MonthKey::parse(&month_str).map_err(|e| conversion_error(0, e))?;

    let state_str: String = row.get("state")?;
    let state = MonthState::from_db_str(&state_str).ok_or_else(|| {
        conversion_error(1, AppError::Validation(format!("Invalid month state: {state_str}")))
    })?;

    Ok(InvoiceMonth {
        month,
        state,
        closed_at: row.get("closed_at")?,
        closed_by: row.get("closed_by")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find_month(conn: &Connection, month: &MonthKey) -> AppResult<Option<InvoiceMonth>> {
    let sql = format!("SELECT {MONTH_COLUMNS} FROM invoice_months WHERE month = ?1");
    Ok(conn
        .query_row(&sql, [month.to_string()], map_invoice_month)
        .optional()?)
}

/// Create the month record in `open` state unless it already exists.
/// Returns the record as stored.
pub fn ensure_month(conn: &Connection, month: &MonthKey) -> AppResult<InvoiceMonth> {
    conn.execute(
        "INSERT OR IGNORE INTO invoice_months (month, state, created_at)
         VALUES (?1, 'open', ?2)",
        params![month.to_string(), now_rfc3339()],
    )?;

    find_month(conn, month)?
        .ok_or_else(|| AppError::Other(format!("invoice month {month} vanished after insert")))
}

/// Compare-and-set `open → closed`. Returns false when the month was not
/// open at the time of the update (missing or already closed).
pub fn close_month(conn: &Connection, month: &MonthKey, closed_by: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE invoice_months
         SET state = 'closed', closed_at = ?1, closed_by = ?2
         WHERE month = ?3 AND state = 'open'",
        params![now_rfc3339(), closed_by, month.to_string()],
    )?;
    Ok(changed == 1)
}

/// Store the close-time snapshot of a month's preview rows.
/// Each row is paired with the id of the project it bills.
pub fn insert_items(
    conn: &Connection,
    month: &MonthKey,
    items: &[(i64, InvoicePreviewItem)],
) -> AppResult<()> {
    let now = now_rfc3339();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO invoice_items (month, project_id, management_no, machine_no,
                                    actual_hours, sort_order, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (i, (project_id, item)) in items.iter().enumerate() {
        stmt.execute(params![
            month.to_string(),
            project_id,
            item.management_no,
            item.machine_no,
            item.actual_hours,
            i as i64,
            now,
        ])?;
    }
    Ok(())
}

/// All known months, newest first, with their snapshot totals.
pub fn list_months(conn: &Connection) -> AppResult<Vec<InvoiceMonthListing>> {
    let mut stmt = conn.prepare(
        "SELECT m.month, m.state, m.closed_at, m.closed_by, m.created_at,
                COUNT(i.id) AS item_count,
                COALESCE(SUM(i.actual_hours), 0) AS total_hours
         FROM invoice_months m
         LEFT JOIN invoice_items i ON i.month = m.month
         GROUP BY m.month
         ORDER BY m.month DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(InvoiceMonthListing {
            invoice: map_invoice_month(row)?,
            item_count: row.get("item_count")?,
            total_hours: row.get("total_hours")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
