pub mod initialize;
pub mod invoices;
pub mod log;
pub mod masters;
pub mod migrate;
pub mod pool;
pub mod projects;
pub mod stats;
pub mod users;
pub mod worklogs;

use crate::errors::AppError;

/// Wrap a parse failure of a stored TEXT column into a rusqlite row error.
pub(crate) fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

/// True when `e` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// True when `e` was raised by one of the month-lock triggers.
pub(crate) fn is_lock_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("locked period")
    )
}
