//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, ArtifactPaths, ExchangeConfig, LoggingConfig, NotifyConfig,
    TradingSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables use the `CORAL` prefix with `__` as the section
/// separator, e.g. `CORAL__EXCHANGE__DRY_RUN=false`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("CORAL")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
