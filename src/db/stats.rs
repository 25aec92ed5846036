use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    let count = |sql: &str| -> rusqlite::Result<i64> {
        pool.conn.query_row(sql, [], |row| row.get(0))
    };
    let users = count("SELECT COUNT(*) FROM users")?;
    let projects = count("SELECT COUNT(*) FROM projects WHERE is_active = 1")?;
    let worklogs = count("SELECT COUNT(*) FROM worklogs")?;
    let closed = count("SELECT COUNT(*) FROM invoice_months WHERE state = 'closed'")?;

    println!("{}• Users:{} {}{}{}", CYAN, RESET, GREEN, users, RESET);
    println!("{}• Active projects:{} {}{}{}", CYAN, RESET, GREEN, projects, RESET);
    println!("{}• Work logs:{} {}{}{}", CYAN, RESET, GREEN, worklogs, RESET);
    println!("{}• Closed months:{} {}{}{}", CYAN, RESET, GREEN, closed, RESET);

    //
    // 3) DATE RANGE
    //
    let first_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT work_date FROM worklogs ORDER BY work_date ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT work_date FROM worklogs ORDER BY work_date DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Work date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) LAST CLOSED MONTH
    //
    let last_closed: Option<String> = pool
        .conn
        .query_row(
            "SELECT month FROM invoice_months WHERE state = 'closed'
             ORDER BY month DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    println!(
        "{}• Last closed month:{} {}",
        CYAN,
        RESET,
        last_closed.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}
