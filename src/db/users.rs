use crate::db::is_unique_violation;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::utils::date::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const USER_COLUMNS: &str = "id, username, email, is_admin, is_active, created_at";

pub fn map_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        is_admin: row.get::<_, i64>("is_admin")? == 1,
        is_active: row.get::<_, i64>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_user(conn: &Connection, username: &str, email: &str, is_admin: bool) -> AppResult<User> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO users (username, email, is_admin, is_active, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        params![username, email, is_admin as i64, now],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("username '{username}' is already taken"))
        } else {
            AppError::from(e)
        }
    })?;

    let id = conn.last_insert_rowid();
    find_user(conn, id)?.ok_or_else(|| AppError::Other(format!("user {id} vanished after insert")))
}

pub fn find_user(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_user).optional()?)
}

pub fn find_user_by_name(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
    Ok(conn.query_row(&sql, [username], map_user).optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_user_active(conn: &Connection, id: i64, active: bool) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE users SET is_active = ?1 WHERE id = ?2",
        params![active as i64, id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    Ok(())
}
