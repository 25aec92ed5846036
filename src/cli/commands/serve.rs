use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::server;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { bind } = cmd {
        let mut cfg = cfg.clone();
        if let Some(addr) = bind {
            cfg.bind_address = addr.clone();
        }

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(server::serve(&cfg))?;
    }
    Ok(())
}
