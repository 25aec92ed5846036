use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub csv_bom: bool,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_token_ttl() -> i64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

/// `RWORKLOG_*` variables; each one that is set wins over the file.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    database: Option<String>,
    bind_address: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_minutes: Option<i64>,
    log_level: Option<String>,
    csv_bom: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            bind_address: default_bind_address(),
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            log_level: default_log_level(),
            csv_bom: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rworklog")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rworklog")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rworklog.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rworklog.sqlite")
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load the config file (defaults when missing), then apply `.env`
    /// and `RWORKLOG_*` overrides.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        let base = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            Self::from_yaml_str(&content)?
        } else {
            Config::default()
        };

        dotenvy::dotenv().ok();
        let mut cfg = base.with_env_overrides()?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn with_env_overrides(self) -> AppResult<Self> {
        let env: EnvOverrides = envy::prefixed("RWORKLOG_")
            .from_env()
            .map_err(|e| AppError::Config(format!("environment: {e}")))?;
        Ok(self.merge(env))
    }

    fn merge(mut self, env: EnvOverrides) -> Self {
        if let Some(v) = env.database {
            self.database = v;
        }
        if let Some(v) = env.bind_address {
            self.bind_address = v;
        }
        if let Some(v) = env.jwt_secret {
            self.jwt_secret = v;
        }
        if let Some(v) = env.token_ttl_minutes {
            self.token_ttl_minutes = v;
        }
        if let Some(v) = env.log_level {
            self.log_level = v;
        }
        if let Some(v) = env.csv_bom {
            self.csv_bom = v;
        }
        self
    }

    /// Initialize configuration and database files.
    ///
    /// In test mode the config file is left untouched and only the database
    /// path is resolved. Returns the resulting configuration.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) if Path::new(&name).is_absolute() => PathBuf::from(name),
            Some(name) => dir.join(name),
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }
}
