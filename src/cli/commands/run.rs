//! Scheduler loop command.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use crate::cli::app;
use crate::cli::RunArgs;

/// Run both cycles on their cadences until interrupted.
///
/// A single task drives both intervals, so at most one cycle runs at a
/// time and the engine never races itself. Cycle errors are logged and
/// the loop keeps going; only startup failures are fatal.
pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let app = app::build(config_path)?;

    let guard_minutes = args
        .guard_minutes
        .unwrap_or(app.config.trading.guard_minutes)
        .max(1);
    let trade_minutes = args
        .trade_minutes
        .unwrap_or(app.config.trading.trade_minutes)
        .max(1);
    info!(guard_minutes, trade_minutes, "scheduler started");

    let mut guard_tick = tokio::time::interval(Duration::from_secs(guard_minutes * 60));
    let mut trade_tick = tokio::time::interval(Duration::from_secs(trade_minutes * 60));

    loop {
        tokio::select! {
            _ = trade_tick.tick() => {
                if let Err(e) = app.trade_once().await {
                    error!(error = %e, "trade cycle failed");
                }
            }
            _ = guard_tick.tick() => {
                if let Err(e) = app.guard_once().await {
                    error!(error = %e, "guard cycle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                return Ok(());
            }
        }
    }
}
