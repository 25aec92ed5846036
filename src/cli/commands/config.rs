use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();
        let path_str = path.to_string_lossy().to_string();

        // ---- PRINT CONFIG ----
        if *print_config {
            println!("📄 Current configuration (file + environment):\n");
            let mut shown = cfg.clone();
            if !shown.jwt_secret.is_empty() {
                shown.jwt_secret = "********".into();
            }
            let yaml = serde_yaml::to_string(&shown).map_err(|e| AppError::Config(e.to_string()))?;
            println!("{yaml}");
        }

        // ---- CHECK CONFIG ----
        if *check {
            if path.exists() {
                ConfigLogic::check(&path_str)?;
            } else {
                warning(format!("No configuration file at {path_str}; run `rworklog init`."));
            }
        }

        // ---- EDIT CONFIG ----
        if *edit_config {
            ConfigLogic::edit(&path_str, editor)?;
        }
    }

    Ok(())
}
