use crate::db::log::ttlog;
use crate::db::masters::find_master;
use crate::db::pool::DbPool;
use crate::db::projects::{
    find_project, find_project_view, insert_project, list_filtered, update_project,
};
use crate::errors::{AppError, AppResult};
use crate::models::page::{Page, PageRequest};
use crate::models::project::{NewProject, Project, ProjectFilter, ProjectPatch, ProjectView};
use crate::models::user::Actor;
use crate::utils::date::{now_rfc3339, today};
use rusqlite::Connection;
use tracing::info;

/// Every master reference must point at a record of the matching kind.
fn check_master_refs(conn: &Connection, project: &Project) -> AppResult<()> {
    for (kind, id) in project.master_refs() {
        let Some(id) = id else { continue };
        match find_master(conn, id)? {
            Some(m) if m.kind == kind => {}
            Some(m) => {
                return Err(AppError::Validation(format!(
                    "master {id} is a {} record, expected {kind}",
                    m.kind
                )));
            }
            None => {
                return Err(AppError::Validation(format!(
                    "{kind} {id} does not exist"
                )));
            }
        }
    }
    Ok(())
}

/// Fill `start_date` / `completion_date` with today when the project's
/// progress status carries the matching trigger and the date is empty.
fn apply_progress_triggers(conn: &Connection, project: &mut Project) -> AppResult<()> {
    let Some(progress_id) = project.progress_id else {
        return Ok(());
    };
    let Some(progress) = find_master(conn, progress_id)? else {
        return Ok(());
    };

    if progress.start_date_trigger && project.start_date.is_none() {
        project.start_date = Some(today());
    }
    if progress.completion_trigger && project.completion_date.is_none() {
        project.completion_date = Some(today());
    }
    Ok(())
}

fn load_view(conn: &Connection, id: i64) -> AppResult<ProjectView> {
    find_project_view(conn, id)?.ok_or_else(|| AppError::NotFound(format!("project {id}")))
}

pub struct ProjectLogic;

impl ProjectLogic {
    pub fn create(pool: &mut DbPool, actor: &Actor, input: NewProject) -> AppResult<ProjectView> {
        let now = now_rfc3339();
        let mut project = input.into_project(Some(actor.user_id), &now);
        project.validate()?;

        let tx = pool.write_tx()?;
        check_master_refs(&tx, &project)?;
        apply_progress_triggers(&tx, &mut project)?;

        let id = insert_project(&tx, &project)?;
        ttlog(
            &tx,
            "add",
            &format!("project {id}"),
            &format!("{} created project {}", actor.username, project.management_no),
        )?;
        let view = load_view(&tx, id)?;
        tx.commit()?;

        info!(id, management_no = %project.management_no, "project created");
        Ok(view)
    }

    pub fn update(
        pool: &mut DbPool,
        actor: &Actor,
        id: i64,
        patch: &ProjectPatch,
    ) -> AppResult<ProjectView> {
        let tx = pool.write_tx()?;

        let current =
            find_project(&tx, id)?.ok_or_else(|| AppError::NotFound(format!("project {id}")))?;
        let mut next = patch.apply_to(&current);
        next.updated_at = now_rfc3339();
        next.validate()?;
        check_master_refs(&tx, &next)?;

        if next.progress_id != current.progress_id {
            apply_progress_triggers(&tx, &mut next)?;
        }

        update_project(&tx, &next)?;
        ttlog(
            &tx,
            "edit",
            &format!("project {id}"),
            &format!("{} updated project {}", actor.username, next.management_no),
        )?;
        let view = load_view(&tx, id)?;
        tx.commit()?;

        info!(id, user = %actor.username, "project updated");
        Ok(view)
    }

    /// Soft delete: the project stays referenced by its work logs.
    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let tx = pool.write_tx()?;

        let mut project =
            find_project(&tx, id)?.ok_or_else(|| AppError::NotFound(format!("project {id}")))?;
        project.is_active = false;
        project.updated_at = now_rfc3339();
        update_project(&tx, &project)?;

        ttlog(
            &tx,
            "del",
            &format!("project {id}"),
            &format!("{} deactivated project {}", actor.username, project.management_no),
        )?;
        tx.commit()?;

        info!(id, "project deactivated");
        Ok(())
    }

    pub fn get(pool: &mut DbPool, id: i64) -> AppResult<ProjectView> {
        load_view(&pool.conn, id)
    }

    pub fn list(
        pool: &mut DbPool,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> AppResult<Page<ProjectView>> {
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
}
