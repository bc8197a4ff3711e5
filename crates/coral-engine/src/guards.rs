//! The guard cycle: drawdown and expiry exits for open positions.

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use coral_core::error::CoralResult;
use coral_core::types::{OrderFill, RiskConfig, Session};

use crate::engine::Engine;
use crate::report::CycleReport;
use crate::sizing::calculate_max_sell_qty;

/// One-minute closes averaged for the drawdown check. A short mean rather
/// than the raw ticker, so a single bad print cannot force an exit.
const SAFETY_LOOKBACK: usize = 5;

impl Engine {
    /// One high-frequency pass over the open positions.
    ///
    /// The safety exit fires on drawdown regardless of the sell gate or
    /// profit sign; the expiry exit only releases winners. A losing
    /// position past its hold time keeps waiting for either recovery or
    /// the safety floor.
    pub async fn guard_cycle(&self) -> CoralResult<CycleReport> {
        let now = Utc::now().timestamp();
        let risk = self.store.risk_config().await?;
        let open = self.store.open_sessions().await?;

        let mut report = CycleReport::default();
        for session in open {
            match self.guard_session(&session, &risk, now).await {
                Ok(Some((fill, closed))) => {
                    report.fills.push(fill);
                    report.closed.push(closed);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(symbol = %session.symbol, error = %e, "guard check failed");
                    report.record_error(&session.symbol, e);
                }
            }
        }
        Ok(report)
    }

    async fn guard_session(
        &self,
        session: &Session,
        risk: &RiskConfig,
        now: i64,
    ) -> CoralResult<Option<(OrderFill, Session)>> {
        if self.drawdown_breached(session, risk).await? {
            return self.safety_exit(session).await.map(Some);
        }
        if now - session.buy_timestamp > risk.hold_time {
            return self.expire_exit(session).await;
        }
        Ok(None)
    }

    /// True when the short-horizon mean price has fallen below the entry
    /// price minus the tolerance fraction.
    async fn drawdown_breached(
        &self,
        session: &Session,
        risk: &RiskConfig,
    ) -> CoralResult<bool> {
        let recent = self
            .exchange
            .klines(&session.symbol, "1m", SAFETY_LOOKBACK)
            .await?;
        if recent.is_empty() {
            return Ok(false);
        }
        let mean = recent.iter().map(|p| p.close).sum::<f64>() / recent.len() as f64;
        let floor = session.buy_price * (Decimal::ONE - risk.tolerance);
        Ok(Decimal::from_f64(mean).map(|m| m < floor).unwrap_or(false))
    }

    /// Dump the recorded quantity at market and close the session.
    async fn safety_exit(&self, session: &Session) -> CoralResult<(OrderFill, Session)> {
        let price = self.exchange.ticker(&session.symbol).await?;
        let fill = self
            .exchange
            .market_sell(&session.symbol, session.quantity)
            .await?;
        let sell_price = fill.price.unwrap_or(price);
        let closed = self
            .store
            .close_session(session.id, sell_price, fill.timestamp)
            .await?;
        info!(
            symbol = %closed.symbol,
            session = closed.id,
            %sell_price,
            buy_price = %closed.buy_price,
            "safety exit"
        );
        Ok((fill, closed))
    }

    /// Release a position past its hold time, but only in profit. Sells
    /// the actual exchange balance floored to the lot step, since dust
    /// and fees can leave less than the recorded quantity.
    async fn expire_exit(
        &self,
        session: &Session,
    ) -> CoralResult<Option<(OrderFill, Session)>> {
        let price = self.exchange.ticker(&session.symbol).await?;
        if session.profit_percent(price) <= Decimal::ZERO {
            debug!(symbol = %session.symbol, "past hold time but not in profit, keeping");
            return Ok(None);
        }

        let base = self.base_asset(&session.symbol)?;
        let balances = self.exchange.balances().await?;
        let held = balances.get(&base).copied().unwrap_or_default();
        let lot = self.exchange.min_qty(&session.symbol).await?;
        let quantity = calculate_max_sell_qty(held, lot);
        if quantity <= Decimal::ZERO {
            warn!(
                symbol = %session.symbol,
                %held,
                %lot,
                "expired session has no sellable balance"
            );
            return Ok(None);
        }

        let fill = self.exchange.market_sell(&session.symbol, quantity).await?;
        let sell_price = fill.price.unwrap_or(price);
        let closed = self
            .store
            .close_session(session.id, sell_price, fill.timestamp)
            .await?;
        info!(
            symbol = %closed.symbol,
            session = closed.id,
            %sell_price,
            %quantity,
            "expiry exit"
        );
        Ok(Some((fill, closed)))
    }
}
