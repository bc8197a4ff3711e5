//! Configuration structures.

use serde::{Deserialize, Serialize};

use coral_core::types::RiskConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub artifacts: ArtifactPaths,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "coral".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Exchange adapter configuration. The API key is read from the named
/// environment variable, never from the file itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub quote_asset: String,
    /// When true, orders are simulated and never reach the exchange.
    pub dry_run: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            api_key_env: "CORAL_API_KEY".to_string(),
            timeout_secs: 10,
            quote_asset: "USDT".to_string(),
            dry_run: true,
        }
    }
}

/// Paths to the offline-trained model artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub model: String,
    pub scaler: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: "artifacts/model.json".to_string(),
            scaler: "artifacts/scaler.json".to_string(),
        }
    }
}

/// Scheduler and universe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSettings {
    /// Symbols scanned each trade cycle, in priority order.
    pub symbols: Vec<String>,
    /// Hourly candles fetched per symbol.
    pub kline_limit: usize,
    /// Minimum hold before a signal-driven exit, in hours.
    pub min_hold_hours: i64,
    /// Look-back for the closed-session summary, in hours.
    pub recent_window_hours: i64,
    /// Guard cycle cadence, in minutes.
    pub guard_minutes: u64,
    /// Trade cycle cadence, in minutes.
    pub trade_minutes: u64,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            kline_limit: 240,
            min_hold_hours: 3,
            recent_window_hours: 24,
            guard_minutes: 3,
            trade_minutes: 60,
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Slack incoming-webhook URL; notifications are disabled when unset.
    pub webhook_url: Option<String>,
}
