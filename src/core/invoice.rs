use crate::core::aggregation::{month_rows_in, month_summary_in, to_summary};
use crate::db::invoices::{close_month, ensure_month, find_month, insert_items, list_months};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::render_csv;
use crate::models::invoice::{InvoiceMonth, InvoiceMonthListing, InvoicePreview, MonthState};
use crate::models::month::MonthKey;
use crate::models::user::Actor;
use crate::utils::date::now_rfc3339;
use tracing::{info, warn};

/// Monthly invoice lifecycle: preview, one-way close, export.
pub struct InvoiceLogic;

impl InvoiceLogic {
    /// Aggregated preview of `month`, wrapped with its lock state.
    /// The month record is created (open) on first request.
    pub fn preview(pool: &mut DbPool, month: &MonthKey) -> AppResult<InvoicePreview> {
        let tx = pool.write_tx()?;
        let invoice = ensure_month(&tx, month)?;
        let summary = month_summary_in(&tx, month)?;
        tx.commit()?;

        Ok(InvoicePreview::new(&invoice, summary))
    }

    /// Close `month`: `open → closed`, exactly once.
    ///
    /// The state check, the compare-and-set and the snapshot of the preview
    /// rows share one immediate transaction, so no work log write can land
    /// between the totals being read and the month being locked.
    pub fn close(pool: &mut DbPool, month: &MonthKey, actor: &Actor) -> AppResult<InvoiceMonth> {
        if !actor.is_admin {
            warn!(month = %month, user = %actor.username, "close rejected: not an admin");
            return Err(AppError::Permission(
                "closing a month requires administrator privileges".into(),
            ));
        }

        let tx = pool.write_tx()?;

        let current = ensure_month(&tx, month)?;
        if current.state.is_closed() {
            warn!(month = %month, "close rejected: already closed");
            return Err(AppError::Conflict(format!("month {month} is already closed")));
        }

        let rows = month_rows_in(&tx, month)?;
        if rows.is_empty() {
            return Err(AppError::Validation(format!(
                "month {month} has no billable hours to close"
            )));
        }

        if !close_month(&tx, month, actor.user_id)? {
            return Err(AppError::Conflict(format!("month {month} is already closed")));
        }

        let snapshot: Vec<_> = rows.iter().map(|r| (r.project_id, r.item.clone())).collect();
        insert_items(&tx, month, &snapshot)?;

        let summary = to_summary(rows)?;
        ttlog(
            &tx,
            "close",
            &month.to_string(),
            &format!(
                "Closed by {} ({} items, {} minutes)",
                actor.username,
                summary.items.len(),
                summary.total_hours
            ),
        )?;

        let closed = find_month(&tx, month)?
            .ok_or_else(|| AppError::Other(format!("invoice month {month} vanished on close")))?;
        tx.commit()?;

        info!(
            month = %month,
            user = %actor.username,
            items = summary.items.len(),
            minutes = summary.total_hours,
            "month closed"
        );
        Ok(closed)
    }

    /// Known months, newest first, with their close-time snapshot totals.
    pub fn list(pool: &mut DbPool) -> AppResult<Vec<InvoiceMonthListing>> {
        let tx = pool.read_tx()?;
        let months = list_months(&tx)?;
        tx.commit()?;
        Ok(months)
    }

    /// Preview without the implicit month creation. Fails with NotFound
    /// when the month has neither a record nor any work logged.
    pub fn export_preview(pool: &mut DbPool, month: &MonthKey) -> AppResult<InvoicePreview> {
        let tx = pool.read_tx()?;
        let invoice = find_month(&tx, month)?;
        let summary = month_summary_in(&tx, month)?;
        tx.commit()?;

        let invoice = match invoice {
            Some(inv) => inv,
            None if summary.items.is_empty() => {
                return Err(AppError::NotFound(format!("no invoice data for {month}")));
            }
            None => InvoiceMonth {
                month: *month,
                state: MonthState::Open,
                closed_at: None,
                closed_by: None,
                created_at: now_rfc3339(),
            },
        };

        Ok(InvoicePreview::new(&invoice, summary))
    }

    /// CSV bytes of `month`: the same rows, in the same order, as the preview.
    /// Works for open and closed months alike.
    pub fn export_csv(pool: &mut DbPool, month: &MonthKey, bom: bool) -> AppResult<Vec<u8>> {
        let preview = Self::export_preview(pool, month)?;
        render_csv(&preview.items, bom)
    }
}
