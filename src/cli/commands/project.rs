use crate::cli::commands::{actor_for, open_pool};
use crate::cli::parser::{Commands, ProjectAction};
use crate::config::Config;
use crate::core::project::ProjectLogic;
use crate::errors::AppResult;
use crate::models::page::{MAX_PER_PAGE, PageRequest};
use crate::models::project::{NewProject, ProjectFilter};
use crate::ui::messages::{info, success};
use crate::utils::colors::{RESET, color_for_budget, colorize_optional};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Project { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        ProjectAction::Add {
            management_no,
            machine_no,
            estimated,
            as_user,
        } => {
            let actor = actor_for(&mut pool, as_user)?;
            let input = NewProject {
                machine_no: machine_no.clone(),
                estimated_hours: *estimated,
                ..NewProject::with_management_no(management_no)
            };
            let view = ProjectLogic::create(&mut pool, &actor, input)?;
            success(format!(
                "Added project {} (id {})",
                view.project.management_no, view.project.id
            ));
        }

        ProjectAction::List { all } => {
            let filter = ProjectFilter {
                include_inactive: *all,
                ..ProjectFilter::default()
            };

            let mut rows = Vec::new();
            let mut page_no = 1;
            loop {
                let page = ProjectLogic::list(
                    &mut pool,
                    &filter,
                    PageRequest::new(Some(page_no), Some(MAX_PER_PAGE))?,
                )?;
                let fetched = page.items.len() as i64;
                rows.extend(page.items);
                if fetched < MAX_PER_PAGE || rows.len() as i64 >= page.total {
                    break;
                }
                page_no += 1;
            }

            if rows.is_empty() {
                info("No projects found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("MANAGEMENT NO", 16),
                Column::new("MACHINE NO", 14),
                Column::new("PROGRESS", 12),
                Column::new("ESTIMATED", 10),
                Column::new("ACTUAL", 10),
            ]);
            for v in rows {
                let p = &v.project;
                let est = p.estimated_hours.map(format_minutes).unwrap_or_else(|| "--".into());
                let color = color_for_budget(v.actual_hours, p.estimated_hours);
                table.add_row(vec![
                    p.id.to_string(),
                    p.management_no.clone(),
                    colorize_optional(p.machine_no.as_deref().unwrap_or("--")),
                    colorize_optional(v.progress_name.as_deref().unwrap_or("--")),
                    colorize_optional(&est),
                    format!("{color}{}{RESET}", format_minutes(v.actual_hours)),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
