pub mod config;
pub mod db;
pub mod export;
pub mod init;
pub mod invoice;
pub mod log;
pub mod project;
pub mod serve;
pub mod user;
pub mod worklog;

use crate::config::Config;
use crate::core::user::UserLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::user::Actor;

/// Resolve `--as <username>` to the actor used for the operation.
pub(crate) fn actor_for(pool: &mut DbPool, username: &str) -> AppResult<Actor> {
    let user = UserLogic::find_active(pool, username)?;
    Ok(Actor::from(&user))
}

/// Open the configured database with its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}
