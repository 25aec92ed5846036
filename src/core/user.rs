use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::users::{find_user_by_name, insert_user, list_users, set_user_active};
use crate::errors::{AppError, AppResult};
use crate::models::user::User;

pub struct UserLogic;

impl UserLogic {
    pub fn add(pool: &mut DbPool, username: &str, email: &str, is_admin: bool) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() || username.chars().count() > 50 {
            return Err(AppError::Validation(
                "username must be between 1 and 50 characters".into(),
            ));
        }

        let tx = pool.write_tx()?;
        let user = insert_user(&tx, username, email.trim(), is_admin)?;
        let role = if is_admin { "admin" } else { "user" };
        ttlog(&tx, "user_add", username, &format!("Added {role} '{username}'"))?;
        tx.commit()?;

        Ok(user)
    }

    pub fn list(pool: &mut DbPool) -> AppResult<Vec<User>> {
        list_users(&pool.conn)
    }

    /// Look up an active user by name, for token issuing and CLI actors.
    pub fn find_active(pool: &mut DbPool, username: &str) -> AppResult<User> {
        let user = find_user_by_name(&pool.conn, username)?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))?;
        if !user.is_active {
            return Err(AppError::Unauthorized(format!("user '{username}' is disabled")));
        }
        Ok(user)
    }

    pub fn set_active(pool: &mut DbPool, username: &str, active: bool) -> AppResult<()> {
        let tx = pool.write_tx()?;
        let user = find_user_by_name(&tx, username)?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))?;
        set_user_active(&tx, user.id, active)?;

        let verb = if active { "Enabled" } else { "Disabled" };
        ttlog(&tx, "user_edit", username, &format!("{verb} '{username}'"))?;
        tx.commit()?;
        Ok(())
    }
}
