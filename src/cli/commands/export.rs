use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::models::month::MonthKey;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        month,
        force,
    } = cmd
    {
        let month = MonthKey::parse(month)?;
        let mut pool = open_pool(cfg)?;
        ExportLogic::export(&mut pool, *format, file, &month, *force, cfg.csv_bom)?;
    }
    Ok(())
}
