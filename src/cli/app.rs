//! Shared wiring: configuration in, a ready-to-run engine out.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use coral_config::{load_config, AppConfig};
use coral_core::traits::PositionStore;
use coral_core::types::Session;
use coral_engine::{CycleReport, Engine, EngineConfig};
use coral_exchange::{RestConfig, RestExchange};
use coral_model::Classifier;
use coral_notify::{summarize, SlackNotifier};
use coral_store::MemoryStore;

pub struct App {
    pub engine: Engine,
    pub store: Arc<MemoryStore>,
    pub notifier: Option<SlackNotifier>,
    pub config: AppConfig,
    /// Start of the next summary window; advances with every summary so a
    /// closed session is reported exactly once.
    summary_cutoff: AtomicI64,
}

/// Build the application from a configuration file.
///
/// Model artifacts are loaded here and a failure is fatal: there is no
/// degraded mode for trading without a model.
pub fn build(config_path: &Path) -> Result<App> {
    let config = load_config(config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let classifier = Classifier::load(
        Path::new(&config.artifacts.model),
        Path::new(&config.artifacts.scaler),
    )
    .context("loading model artifacts")?;

    let api_key = std::env::var(&config.exchange.api_key_env).ok();
    if api_key.is_none() && !config.exchange.dry_run {
        warn!(
            env = %config.exchange.api_key_env,
            "no API key set while dry run is off"
        );
    }
    let exchange = RestExchange::new(RestConfig {
        base_url: config.exchange.base_url.clone(),
        api_key,
        timeout_secs: config.exchange.timeout_secs,
        dry_run: config.exchange.dry_run,
    })
    .context("building exchange client")?;

    let store = Arc::new(MemoryStore::new(config.risk.clone()));
    let engine = Engine::new(
        Arc::new(exchange),
        store.clone(),
        classifier,
        EngineConfig {
            symbols: config.trading.symbols.clone(),
            kline_limit: config.trading.kline_limit,
            min_hold_secs: config.trading.min_hold_hours * 3600,
            quote_asset: config.exchange.quote_asset.clone(),
        },
    );
    let notifier = config.notify.webhook_url.clone().map(SlackNotifier::new);

    info!(
        app = %config.app.name,
        symbols = config.trading.symbols.len(),
        dry_run = config.exchange.dry_run,
        "application built"
    );

    let summary_cutoff = AtomicI64::new(
        Utc::now().timestamp() - config.trading.recent_window_hours * 3600,
    );

    Ok(App {
        engine,
        store,
        notifier,
        config,
        summary_cutoff,
    })
}

impl App {
    /// One trade cycle plus the notification summary of everything closed
    /// since the previous summary, guard exits included.
    pub async fn trade_once(&self) -> Result<()> {
        let report = self.engine.trade_cycle().await?;
        log_report("trade", &report);

        let closed = self.closed_for_summary().await?;
        if let (Some(notifier), Some(summary)) = (&self.notifier, summarize(&closed)) {
            notifier.send(&summary).await;
        }
        Ok(())
    }

    /// One guard cycle. Its exits are logged here and summarized by the
    /// next trade cycle, so Slack sees each close only once.
    pub async fn guard_once(&self) -> Result<()> {
        let report = self.engine.guard_cycle().await?;
        log_report("guard", &report);
        Ok(())
    }

    /// Sessions closed in the window since the previous summary, which
    /// then advances to now. A close landing at this exact second defers
    /// to the next window rather than risk being reported twice.
    async fn closed_for_summary(&self) -> Result<Vec<Session>> {
        let now = Utc::now().timestamp();
        let cutoff = self.summary_cutoff.swap(now, Ordering::SeqCst);
        let mut closed = self.store.closed_since(cutoff).await?;
        closed.retain(|s| s.sell_timestamp.map(|t| t < now).unwrap_or(false));
        Ok(closed)
    }
}

fn log_report(cycle: &str, report: &CycleReport) {
    if report.is_quiet() {
        info!(cycle, scanned = report.signals.len(), "cycle complete, no activity");
        return;
    }
    info!(
        cycle,
        scanned = report.signals.len(),
        fills = report.fills.len(),
        closed = report.closed.len(),
        errors = report.errors.len(),
        "cycle complete"
    );
    for (symbol, message) in &report.errors {
        warn!(cycle, %symbol, %message, "cycle error");
    }
}
