use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::core::token::TokenKeys;
use crate::core::user::UserLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET, YELLOW};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::User { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        UserAction::Add {
            username,
            email,
            admin,
        } => {
            let user = UserLogic::add(&mut pool, username, email, *admin)?;
            let role = if user.is_admin { "admin" } else { "user" };
            success(format!("Added {role} '{}' (id {})", user.username, user.id));
        }

        UserAction::List => {
            let users = UserLogic::list(&mut pool)?;
            if users.is_empty() {
                info("No users yet. Add one with `rworklog user add <name>`.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("USERNAME", 20),
                Column::new("EMAIL", 28),
                Column::new("ROLE", 6),
                Column::new("STATUS", 8),
            ]);
            for u in users {
                let role = if u.is_admin {
                    format!("{YELLOW}admin{RESET}")
                } else {
                    "user".to_string()
                };
                let status = if u.is_active {
                    "active".to_string()
                } else {
                    format!("{GREY}disabled{RESET}")
                };
                table.add_row(vec![u.id.to_string(), u.username, u.email, role, status]);
            }
            print!("{}", table.render());
        }

        UserAction::Token { username } => {
            let keys = TokenKeys::new(&cfg.jwt_secret, cfg.token_ttl_minutes)?;
            let user = UserLogic::find_active(&mut pool, username)?;
            // bare token on stdout so it can be captured by scripts
            println!("{}", keys.issue(&user)?);
        }

        UserAction::Disable { username } => {
            UserLogic::set_active(&mut pool, username, false)?;
            success(format!("Disabled '{username}'"));
        }

        UserAction::Enable { username } => {
            UserLogic::set_active(&mut pool, username, true)?;
            success(format!("Enabled '{username}'"));
        }
    }

    Ok(())
}
