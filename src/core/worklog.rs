use crate::db::invoices::find_month;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::projects::find_project;
use crate::db::worklogs::{
    delete_worklog, find_worklog, insert_worklog, list_by_month, list_by_project, list_filtered,
    update_worklog,
};
use crate::errors::{AppError, AppResult};
use crate::models::month::MonthKey;
use crate::models::page::{Page, PageRequest};
use crate::models::user::Actor;
use crate::models::worklog::{NewWorkLog, WorkLog, WorkLogFilter, WorkLogPatch};
use crate::utils::date::now_rfc3339;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{info, warn};

/// Fail with `LockedPeriod` when the month of `date` has been closed.
fn ensure_unlocked(conn: &Connection, date: NaiveDate) -> AppResult<()> {
    if let Some(invoice) = find_month(conn, &MonthKey::of(date))?
        && invoice.state.is_closed()
    {
        warn!(month = %invoice.month, "work log mutation rejected: month is closed");
        return Err(invoice.locked_error());
    }
    Ok(())
}

fn ensure_project(conn: &Connection, project_id: i64) -> AppResult<()> {
    if find_project(conn, project_id)?.is_none() {
        return Err(AppError::Validation(format!(
            "project_id {project_id} does not reference an existing project"
        )));
    }
    Ok(())
}

fn load(conn: &Connection, id: i64) -> AppResult<WorkLog> {
    find_worklog(conn, id)?.ok_or_else(|| AppError::NotFound(format!("work log {id}")))
}

fn ensure_owner(actor: &Actor, wl: &WorkLog) -> AppResult<()> {
    if !actor.can_modify(wl.user_id) {
        warn!(id = wl.id, user = %actor.username, "work log mutation rejected: not the owner");
        return Err(AppError::Permission(format!(
            "work log {} belongs to another user",
            wl.id
        )));
    }
    Ok(())
}

/// Work log store. Every mutation checks the month lock inside the same
/// immediate transaction that performs the write.
pub struct WorkLogLogic;

impl WorkLogLogic {
    pub fn create(pool: &mut DbPool, actor: &Actor, input: NewWorkLog) -> AppResult<WorkLog> {
        input.validate()?;

        let tx = pool.write_tx()?;
        ensure_unlocked(&tx, input.work_date)?;
        ensure_project(&tx, input.project_id)?;

        let now = now_rfc3339();
        let mut wl = WorkLog {
            id: 0,
            project_id: input.project_id,
            user_id: actor.user_id,
            work_date: input.work_date,
            start_time: input.start_time,
            end_time: input.end_time,
            duration_minutes: input.duration_minutes,
            work_content: input.work_content,
            created_at: now.clone(),
            updated_at: now,
        };
        wl.id = insert_worklog(&tx, &wl)?;

        ttlog(
            &tx,
            "add",
            &format!("worklog {}", wl.id),
            &format!(
                "{} logged {} min on project {} for {}",
                actor.username, wl.duration_minutes, wl.project_id, wl.work_date
            ),
        )?;
        tx.commit()?;

        info!(id = wl.id, project = wl.project_id, user = %actor.username, "work log created");
        Ok(wl)
    }

    pub fn update(
        pool: &mut DbPool,
        actor: &Actor,
        id: i64,
        patch: &WorkLogPatch,
    ) -> AppResult<WorkLog> {
        let tx = pool.write_tx()?;

        let current = load(&tx, id)?;
        ensure_owner(actor, &current)?;
        ensure_unlocked(&tx, current.work_date)?;

        let mut next = patch.apply_to(&current);
        next.updated_at = now_rfc3339();
        next.validate()?;

        if next.work_date != current.work_date {
            ensure_unlocked(&tx, next.work_date)?;
        }
        if next.project_id != current.project_id {
            ensure_project(&tx, next.project_id)?;
        }

        update_worklog(&tx, &next)?;
        ttlog(
            &tx,
            "edit",
            &format!("worklog {id}"),
            &format!(
                "{} updated work log ({} min on {})",
                actor.username, next.duration_minutes, next.work_date
            ),
        )?;
        tx.commit()?;

        info!(id, user = %actor.username, "work log updated");
        Ok(next)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let tx = pool.write_tx()?;

        let current = load(&tx, id)?;
        ensure_owner(actor, &current)?;
        ensure_unlocked(&tx, current.work_date)?;

        delete_worklog(&tx, &current)?;
        ttlog(
            &tx,
            "del",
            &format!("worklog {id}"),
            &format!("{} deleted work log of {}", actor.username, current.work_date),
        )?;
        tx.commit()?;

        info!(id, user = %actor.username, "work log deleted");
        Ok(())
    }

    pub fn get(pool: &mut DbPool, id: i64) -> AppResult<WorkLog> {
        load(&pool.conn, id)
    }

    pub fn list(
        pool: &mut DbPool,
        filter: &WorkLogFilter,
        page: PageRequest,
    ) -> AppResult<Page<WorkLog>> {
        let tx = pool.read_tx()?;
        let (items, total) = list_filtered(&tx, filter, page)?;
        tx.commit()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    pub fn list_by_month(pool: &mut DbPool, month: &MonthKey) -> AppResult<Vec<WorkLog>> {
        list_by_month(&pool.conn, month)
    }

    pub fn list_by_project(pool: &mut DbPool, project_id: i64) -> AppResult<Vec<WorkLog>> {
        list_by_project(&pool.conn, project_id)
    }
}
