use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// A schema step. Applied at most once; applied versions are recorded in
/// the `log` table as `operation = 'migration_applied'`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20260302_0001_initial_schema",
        description: "Created users, masters, projects, worklogs and invoice tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL DEFAULT '',
            is_admin    INTEGER NOT NULL DEFAULT 0 CHECK(is_admin IN (0,1)),
            is_active   INTEGER NOT NULL DEFAULT 1 CHECK(is_active IN (0,1)),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS master_records (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            kind                TEXT NOT NULL
                                CHECK(kind IN ('progress','work_category','inquiry','machine_series')),
            name                TEXT NOT NULL,
            color               TEXT,
            sort_order          INTEGER NOT NULL DEFAULT 0,
            is_active           INTEGER NOT NULL DEFAULT 1,
            start_date_trigger  INTEGER NOT NULL DEFAULT 0,
            completion_trigger  INTEGER NOT NULL DEFAULT 0,
            display_name        TEXT,
            description         TEXT,
            category            TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL,
            UNIQUE(kind, name)
        );

        CREATE TABLE IF NOT EXISTS projects (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            management_no       TEXT NOT NULL UNIQUE,
            machine_no          TEXT,
            machine_series_id   INTEGER REFERENCES master_records(id),
            generation          TEXT,
            tonnage             TEXT,
            spec_tags           TEXT,
            commission_content  TEXT,
            inquiry_id          INTEGER REFERENCES master_records(id),
            work_category_id    INTEGER REFERENCES master_records(id),
            progress_id         INTEGER REFERENCES master_records(id),
            estimated_hours     INTEGER CHECK(estimated_hours IS NULL OR estimated_hours >= 0),
            start_date          TEXT,
            completion_date     TEXT,
            drawing_deadline    TEXT,
            is_active           INTEGER NOT NULL DEFAULT 1,
            created_by          INTEGER REFERENCES users(id),
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS worklogs (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id        INTEGER NOT NULL REFERENCES projects(id),
            user_id           INTEGER NOT NULL REFERENCES users(id),
            work_date         TEXT NOT NULL,
            start_time        TEXT,
            end_time          TEXT,
            duration_minutes  INTEGER NOT NULL CHECK(duration_minutes BETWEEN 1 AND 1440),
            work_content      TEXT,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_worklogs_work_date ON worklogs(work_date);
        CREATE INDEX IF NOT EXISTS idx_worklogs_project ON worklogs(project_id, work_date);
        CREATE INDEX IF NOT EXISTS idx_worklogs_user ON worklogs(user_id);

        CREATE TABLE IF NOT EXISTS invoice_months (
            month       TEXT PRIMARY KEY,
            state       TEXT NOT NULL DEFAULT 'open' CHECK(state IN ('open','closed')),
            closed_at   TEXT,
            closed_by   INTEGER REFERENCES users(id),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS invoice_items (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            month          TEXT NOT NULL REFERENCES invoice_months(month),
            project_id     INTEGER NOT NULL REFERENCES projects(id),
            management_no  TEXT NOT NULL,
            machine_no     TEXT NOT NULL DEFAULT '',
            actual_hours   INTEGER NOT NULL,
            sort_order     INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_invoice_items_month ON invoice_items(month, sort_order);
        "#,
    },
    Migration {
        version: "20260302_0002_month_lock_guards",
        description: "Added triggers rejecting worklog writes in closed months and reopening",
        sql: r#"
        CREATE TRIGGER IF NOT EXISTS trg_invoice_months_terminal
        BEFORE UPDATE OF state ON invoice_months
        WHEN OLD.state = 'closed'
        BEGIN
            SELECT RAISE(ABORT, 'closed month is terminal');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_worklogs_locked_insert
        BEFORE INSERT ON worklogs
        WHEN EXISTS (SELECT 1 FROM invoice_months
                     WHERE month = substr(NEW.work_date, 1, 7) AND state = 'closed')
        BEGIN
            SELECT RAISE(ABORT, 'locked period');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_worklogs_locked_update
        BEFORE UPDATE ON worklogs
        WHEN EXISTS (SELECT 1 FROM invoice_months
                     WHERE state = 'closed'
                       AND month IN (substr(OLD.work_date, 1, 7), substr(NEW.work_date, 1, 7)))
        BEGIN
            SELECT RAISE(ABORT, 'locked period');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_worklogs_locked_delete
        BEFORE DELETE ON worklogs
        WHEN EXISTS (SELECT 1 FROM invoice_months
                     WHERE month = substr(OLD.work_date, 1, 7) AND state = 'closed')
        BEGIN
            SELECT RAISE(ABORT, 'locked period');
        END;
        "#,
    },
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;

    tx.commit()?;
    info!(version = m.version, "migration applied");
    Ok(())
}

/// Versions already applied to this database, in application order.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations. Returns how many ran.
///
/// Invoked by db::init_db() and by `db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied += 1;
    }

    Ok(applied)
}
