use crate::db::log::ttlog;
use crate::db::masters::{
    count_references, find_master, insert_master, list_masters, set_master_active, update_master,
};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::master::{MasterKind, MasterPatch, MasterRecord, NewMasterRecord};
use crate::models::user::Actor;
use rusqlite::Connection;
use tracing::{info, warn};

fn require_admin(actor: &Actor) -> AppResult<()> {
    if !actor.is_admin {
        warn!(user = %actor.username, "master change rejected: not an admin");
        return Err(AppError::Permission(
            "master tables can only be changed by an administrator".into(),
        ));
    }
    Ok(())
}

/// Load a record and check it belongs to `kind`; a record of another kind
/// is reported as missing.
fn load(conn: &Connection, kind: MasterKind, id: i64) -> AppResult<MasterRecord> {
    match find_master(conn, id)? {
        Some(m) if m.kind == kind => Ok(m),
        _ => Err(AppError::NotFound(format!("{kind} {id}"))),
    }
}

/// Admin-managed lookup lists (progress, work category, inquiry, series).
pub struct MasterLogic;

impl MasterLogic {
    pub fn list(
        pool: &mut DbPool,
        kind: MasterKind,
        include_inactive: bool,
    ) -> AppResult<Vec<MasterRecord>> {
        list_masters(&pool.conn, kind, include_inactive)
    }

    pub fn get(pool: &mut DbPool, kind: MasterKind, id: i64) -> AppResult<MasterRecord> {
        load(&pool.conn, kind, id)
    }

    pub fn create(
        pool: &mut DbPool,
        actor: &Actor,
        kind: MasterKind,
        input: &NewMasterRecord,
    ) -> AppResult<MasterRecord> {
        require_admin(actor)?;
        input.validate(kind)?;

        let tx = pool.write_tx()?;
        let id = insert_master(&tx, kind, input)?;
        ttlog(
            &tx,
            "add",
            &format!("{kind} {id}"),
            &format!("{} added '{}'", actor.username, input.name.trim()),
        )?;
        let rec = load(&tx, kind, id)?;
        tx.commit()?;

        info!(%kind, id, "master record created");
        Ok(rec)
    }

    pub fn update(
        pool: &mut DbPool,
        actor: &Actor,
        kind: MasterKind,
        id: i64,
        patch: &MasterPatch,
    ) -> AppResult<MasterRecord> {
        require_admin(actor)?;

        let tx = pool.write_tx()?;
        let current = load(&tx, kind, id)?;
        let next = patch.apply_to(&current);

        next.validate()?;

        update_master(&tx, &next)?;
        ttlog(
            &tx,
            "edit",
            &format!("{kind} {id}"),
            &format!("{} updated '{}'", actor.username, next.name),
        )?;
        let rec = load(&tx, kind, id)?;
        tx.commit()?;

        Ok(rec)
    }

    /// Deactivate; master records are never removed.
    pub fn delete(pool: &mut DbPool, actor: &Actor, kind: MasterKind, id: i64) -> AppResult<()> {
        require_admin(actor)?;

        let tx = pool.write_tx()?;
        let current = load(&tx, kind, id)?;
        let refs = count_references(&tx, id)?;
        set_master_active(&tx, id, false)?;
        ttlog(
            &tx,
            "del",
            &format!("{kind} {id}"),
            &format!(
                "{} deactivated '{}' ({} referencing projects)",
                actor.username, current.name, refs
            ),
        )?;
        tx.commit()?;

        info!(%kind, id, "master record deactivated");
        Ok(())
    }
}
