//! Validate configuration command.

use anyhow::Result;
use std::path::Path;

use coral_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Exchange: {}", config.exchange.base_url);
            println!("Dry run: {}", config.exchange.dry_run);
            println!("Symbols: {}", config.trading.symbols.join(", "));
            println!("Allow buy: {}", config.risk.allow_buy);
            println!("Allow sell: {}", config.risk.allow_sell);
            println!("Budget: {}", config.risk.budget);
            println!("Max trades: {}", config.risk.max_trade);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
