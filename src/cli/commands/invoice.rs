use crate::cli::commands::{actor_for, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::invoice::InvoiceLogic;
use crate::errors::AppResult;
use crate::models::month::MonthKey;
use crate::ui::messages::{header, info, success};
use crate::utils::colors::{RESET, color_for_state};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;

/// `preview --month` and `close --month --as`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Preview { month } => {
            let month = MonthKey::parse(month)?;
            let mut pool = open_pool(cfg)?;
            let preview = InvoiceLogic::preview(&mut pool, &month)?;

            let closed = preview.state.is_closed();
            header(format!(
                "Invoice {} {}[{}]{}",
                preview.month,
                color_for_state(closed),
                preview.state.to_db_str(),
                RESET
            ));

            if preview.items.is_empty() {
                info(format!("No billable hours in {month}."));
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("MANAGEMENT NO", 16),
                Column::new("MACHINE NO", 14),
                Column::new("MINUTES", 8),
                Column::new("HH:MM", 7),
            ]);
            for item in &preview.items {
                table.add_row(vec![
                    item.management_no.clone(),
                    item.machine_no.clone(),
                    item.actual_hours.to_string(),
                    format_minutes(item.actual_hours),
                ]);
            }
            print!("{}", table.render());
            println!(
                "Total: {} min ({})",
                preview.total_hours,
                format_minutes(preview.total_hours)
            );
        }

        Commands::Close { month, as_user } => {
            let month = MonthKey::parse(month)?;
            let mut pool = open_pool(cfg)?;
            let actor = actor_for(&mut pool, as_user)?;
            let closed = InvoiceLogic::close(&mut pool, &month, &actor)?;
            success(format!(
                "Month {} closed by {} at {}",
                closed.month,
                actor.username,
                closed.closed_at.unwrap_or_default()
            ));
        }

        _ => {}
    }
    Ok(())
}
