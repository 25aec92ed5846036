use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::fs;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &str) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        println!("{}", content);
        Ok(())
    }

    /// Parse the file and report settings that would stop `serve`.
    pub fn check(path: &str) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{path}: {e}")))?;

        let mut problems = 0;
        if cfg.jwt_secret.trim().is_empty() {
            warning("jwt_secret is empty; the HTTP server will refuse to start.");
            problems += 1;
        }
        if cfg.bind_address.parse::<std::net::SocketAddr>().is_err() {
            warning(format!("bind_address '{}' is not a socket address.", cfg.bind_address));
            problems += 1;
        }
        if cfg.token_ttl_minutes < 1 {
            warning("token_ttl_minutes must be positive.");
            problems += 1;
        }

        if problems == 0 {
            success(format!("Configuration OK: {path}"));
            Ok(())
        } else {
            Err(AppError::Config(format!("{problems} problem(s) in {path}")))
        }
    }

    pub fn edit(path: &str, editor: &Option<String>) -> AppResult<()> {
        let ed = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "nano".into());

        Command::new(ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(())
    }
}
