use crate::cli::commands::{actor_for, open_pool};
use crate::cli::parser::{Commands, WorklogAction};
use crate::config::Config;
use crate::core::worklog::WorkLogLogic;
use crate::db::projects::find_project_by_management_no;
use crate::errors::{AppError, AppResult};
use crate::models::month::MonthKey;
use crate::models::worklog::NewWorkLog;
use crate::ui::messages::{info, success};
use crate::utils::date::parse_date;
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_minutes, format_time, parse_optional_time};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Worklog { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        WorklogAction::Add {
            project,
            date,
            minutes,
            start,
            end,
            content,
            as_user,
        } => {
            let actor = actor_for(&mut pool, as_user)?;
            let work_date = parse_date(date).ok_or_else(|| {
                AppError::Validation(format!("invalid date '{date}', expected YYYY-MM-DD"))
            })?;
            let project = find_project_by_management_no(&pool.conn, project)?
                .ok_or_else(|| AppError::Validation(format!("unknown project '{project}'")))?;

            let input = NewWorkLog {
                project_id: project.id,
                work_date,
                start_time: parse_optional_time(start.as_deref())?,
                end_time: parse_optional_time(end.as_deref())?,
                duration_minutes: *minutes,
                work_content: content.clone(),
            };
            let wl = WorkLogLogic::create(&mut pool, &actor, input)?;
            success(format!(
                "Logged {} on {} for {} (id {})",
                format_minutes(wl.duration_minutes),
                project.management_no,
                wl.work_date,
                wl.id
            ));
        }

        WorklogAction::List { month } => {
            let month = MonthKey::parse(month)?;
            let logs = WorkLogLogic::list_by_month(&mut pool, &month)?;
            if logs.is_empty() {
                info(format!("No work logs in {month}."));
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("DATE", 10),
                Column::new("PROJECT", 8),
                Column::new("USER", 8),
                Column::new("IN", 5),
                Column::new("OUT", 5),
                Column::new("TIME", 6),
                Column::new("CONTENT", 30),
            ]);
            let mut total = 0;
            for wl in logs {
                total += wl.duration_minutes;
                table.add_row(vec![
                    wl.id.to_string(),
                    wl.work_date.to_string(),
                    wl.project_id.to_string(),
                    wl.user_id.to_string(),
                    wl.start_time.as_ref().map(format_time).unwrap_or_default(),
                    wl.end_time.as_ref().map(format_time).unwrap_or_default(),
                    format_minutes(wl.duration_minutes),
                    wl.work_content.unwrap_or_default(),
                ]);
            }
            print!("{}", table.render());
            println!("Total: {} ({} min)", format_minutes(total), total);
        }
    }

    Ok(())
}
