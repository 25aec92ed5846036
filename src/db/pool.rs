//! SQLite connection wrapper.
//!
//! One `DbPool` owns one connection. The HTTP server keeps a single pool
//! behind a mutex, so every unit of work (a transaction) runs alone;
//! separate processes (CLI next to a running server) are serialised by
//! SQLite's own locking with a busy timeout.

use rusqlite::{Connection, Result, Transaction, TransactionBehavior};
use std::path::Path;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        configure(&conn, true)?;
        Ok(Self { conn })
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        configure(&conn, false)?;
        Ok(Self { conn })
    }

    /// Read transaction: every statement inside sees the same snapshot.
    pub fn read_tx(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
    }

    /// Write transaction: takes the write lock up front (`BEGIN IMMEDIATE`)
    /// so a lock check and the write that depends on it cannot interleave
    /// with another writer.
    pub fn write_tx(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
    }
}

fn configure(conn: &Connection, file_backed: bool) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;
    if file_backed {
        // journal_mode returns a row, so read it back instead of pragma_update
        let _mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;
    }
    Ok(())
}
