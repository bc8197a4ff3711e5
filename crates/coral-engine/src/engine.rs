//! The trade cycle: signal scan, signal-driven exits, entries.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use coral_core::error::{CoralError, CoralResult, FeatureError};
use coral_core::traits::{Exchange, PositionStore};
use coral_core::types::{NewSession, OrderFill, RiskConfig, Session, Signal};
use coral_features::{enrich, last_window};
use coral_model::Classifier;

use crate::report::CycleReport;
use crate::sizing::calculate_max_qty;

/// Engine settings that do not change at runtime. Operator-adjustable
/// risk limits live in [`RiskConfig`] and are re-read every cycle.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Symbol universe scanned by the trade cycle, in priority order.
    pub symbols: Vec<String>,
    /// Hourly candles fetched per symbol for the feature pipeline.
    pub kline_limit: usize,
    /// Minimum holding period before a signal-driven exit.
    pub min_hold_secs: i64,
    /// Quote asset every universe symbol trades against.
    pub quote_asset: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            kline_limit: 240,
            min_hold_secs: 3 * 3600,
            quote_asset: "USDT".to_string(),
        }
    }
}

/// Drives both decision cycles against an exchange and a position store.
///
/// The engine is the sole writer of session transitions. Symbols are
/// processed sequentially and the risk configuration is snapshotted once
/// per cycle, so every decision within a cycle sees the same limits.
pub struct Engine {
    pub(crate) exchange: Arc<dyn Exchange>,
    pub(crate) store: Arc<dyn PositionStore>,
    classifier: Classifier,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(
        exchange: Arc<dyn Exchange>,
        store: Arc<dyn PositionStore>,
        classifier: Classifier,
        config: EngineConfig,
    ) -> Self {
        Self {
            exchange,
            store,
            classifier,
            config,
        }
    }

    /// One low-frequency cycle: scan the universe, exit on Sell signals,
    /// enter on Buy signals.
    ///
    /// When the book already holds `max_trade` positions the scan is
    /// skipped outright; the guard cycle remains responsible for exits
    /// until a slot frees up.
    pub async fn trade_cycle(&self) -> CoralResult<CycleReport> {
        let risk = self.store.risk_config().await?;
        let open = self.store.open_sessions().await?;
        if open.len() >= risk.max_trade {
            info!(
                open = open.len(),
                max_trade = risk.max_trade,
                "position book full, skipping signal scan"
            );
            return Ok(CycleReport::default());
        }

        let mut signals = Vec::with_capacity(self.config.symbols.len());
        let mut scan_errors = Vec::new();
        for symbol in &self.config.symbols {
            match self.classify_symbol(symbol).await {
                Ok(signal) => {
                    info!(%symbol, %signal, "scan");
                    signals.push((symbol.clone(), signal));
                }
                Err(e) => {
                    warn!(%symbol, error = %e, "signal scan failed");
                    scan_errors.push((symbol.clone(), e.to_string()));
                }
            }
        }

        let mut report = self.apply_signals_with(&risk, signals).await?;
        report.errors.extend(scan_errors);
        Ok(report)
    }

    /// Execute the exit and entry passes for an already-computed signal
    /// set. Split from [`Self::trade_cycle`] so the execution rules can be
    /// driven without a model.
    pub async fn apply_signals(
        &self,
        signals: Vec<(String, Signal)>,
    ) -> CoralResult<CycleReport> {
        let risk = self.store.risk_config().await?;
        self.apply_signals_with(&risk, signals).await
    }

    /// Every gate in one cycle reads the same snapshot; an operator update
    /// landing mid-cycle takes effect next cycle.
    async fn apply_signals_with(
        &self,
        risk: &RiskConfig,
        signals: Vec<(String, Signal)>,
    ) -> CoralResult<CycleReport> {
        let now = Utc::now().timestamp();
        let mut report = CycleReport {
            signals,
            ..CycleReport::default()
        };

        self.execute_signal_exits(risk, now, &mut report).await?;
        self.execute_entries(risk, &mut report).await?;
        Ok(report)
    }

    /// Classify one symbol from its recent hourly history. Too little
    /// history for a complete feature window reads as Hold, not an error.
    async fn classify_symbol(&self, symbol: &str) -> CoralResult<Signal> {
        let points = self
            .exchange
            .klines(symbol, "1h", self.config.kline_limit)
            .await?;
        let rows = enrich(&points);
        match last_window(&rows) {
            Ok(window) => Ok(self.classifier.classify(&window)?),
            Err(FeatureError::InsufficientHistory {
                required,
                available,
            }) => {
                debug!(%symbol, required, available, "insufficient history, holding");
                Ok(Signal::Hold)
            }
            Err(FeatureError::IncompleteRow { index }) => {
                debug!(%symbol, index, "indicators not warmed up, holding");
                Ok(Signal::Hold)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn execute_signal_exits(
        &self,
        risk: &RiskConfig,
        now: i64,
        report: &mut CycleReport,
    ) -> CoralResult<()> {
        if !risk.allow_sell {
            return Ok(());
        }
        let sell_symbols: Vec<String> = report
            .signals
            .iter()
            .filter(|(_, signal)| *signal == Signal::Sell)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        for symbol in &sell_symbols {
            let Some(session) = self.store.session_for_symbol(symbol).await? else {
                continue;
            };
            match self.try_signal_exit(&session, now).await {
                Ok(Some((fill, closed))) => {
                    info!(
                        %symbol,
                        session = closed.id,
                        sell_price = %fill.price.unwrap_or_default(),
                        "closed on sell signal"
                    );
                    report.fills.push(fill);
                    report.closed.push(closed);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(%symbol, error = %e, "signal exit failed");
                    report.errors.push((symbol.clone(), e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Sell on signal only when the position is in profit and past the
    /// minimum holding period; otherwise keep holding and let the guard
    /// cycle decide.
    async fn try_signal_exit(
        &self,
        session: &Session,
        now: i64,
    ) -> CoralResult<Option<(OrderFill, Session)>> {
        let price = self.exchange.ticker(&session.symbol).await?;
        if session.profit_percent(price) <= Decimal::ZERO {
            debug!(symbol = %session.symbol, "sell signal but not in profit");
            return Ok(None);
        }
        if !self.past_min_hold(session, now) {
            debug!(symbol = %session.symbol, "sell signal inside minimum hold");
            return Ok(None);
        }
        let fill = self
            .exchange
            .market_sell(&session.symbol, session.quantity)
            .await?;
        let closed = self
            .store
            .close_session(session.id, fill.price.unwrap_or(price), fill.timestamp)
            .await?;
        Ok(Some((fill, closed)))
    }

    async fn execute_entries(
        &self,
        risk: &RiskConfig,
        report: &mut CycleReport,
    ) -> CoralResult<()> {
        if !risk.allow_buy {
            return Ok(());
        }
        let open = self.store.open_sessions().await?;
        if open.len() >= risk.max_trade {
            return Ok(());
        }
        let owned: HashSet<&str> = open.iter().map(|s| s.symbol.as_str()).collect();
        let slots = risk.max_trade - open.len();
        let candidates: Vec<String> = report
            .signals
            .iter()
            .filter(|(symbol, signal)| *signal == Signal::Buy && !owned.contains(symbol.as_str()))
            .map(|(symbol, _)| symbol.clone())
            .take(slots)
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let balances = self.exchange.balances().await?;
        let quote = balances
            .get(&self.config.quote_asset)
            .copied()
            .unwrap_or_default();
        if quote < risk.budget {
            info!(%quote, budget = %risk.budget, "quote balance below budget, no entries");
            return Ok(());
        }

        for symbol in candidates {
            match self.try_entry(&symbol, risk).await {
                Ok(Some((fill, session))) => {
                    info!(
                        %symbol,
                        session = session.id,
                        buy_price = %session.buy_price,
                        quantity = %session.quantity,
                        "position opened"
                    );
                    report.fills.push(fill);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(%symbol, error = %e, "entry failed");
                    report.errors.push((symbol, e.to_string()));
                }
            }
        }
        Ok(())
    }

    async fn try_entry(
        &self,
        symbol: &str,
        risk: &RiskConfig,
    ) -> CoralResult<Option<(OrderFill, Session)>> {
        let price = self.exchange.ticker(symbol).await?;
        let lot = self.exchange.min_qty(symbol).await?;
        let quantity = calculate_max_qty(price, risk.budget, lot);
        if quantity <= Decimal::ZERO {
            debug!(%symbol, %price, %lot, "budget below one lot, skipping");
            return Ok(None);
        }
        let fill = self.exchange.market_buy(symbol, quantity).await?;
        let session = self
            .store
            .insert_session(NewSession {
                symbol: symbol.to_string(),
                buy_price: fill.price.unwrap_or(price),
                quantity,
                buy_timestamp: fill.timestamp,
            })
            .await?;
        Ok(Some((fill, session)))
    }

    /// True once a position has been held strictly longer than the
    /// minimum holding period; a hold of exactly the minimum stays.
    fn past_min_hold(&self, session: &Session, now: i64) -> bool {
        session.holding_secs(now) > self.config.min_hold_secs
    }

    /// Base asset of a universe symbol, e.g. "BTCUSDT" -> "BTC".
    pub(crate) fn base_asset(&self, symbol: &str) -> CoralResult<String> {
        symbol
            .strip_suffix(self.config.quote_asset.as_str())
            .filter(|base| !base.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CoralError::Internal(format!(
                    "symbol {symbol} does not trade against {}",
                    self.config.quote_asset
                ))
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use coral_core::types::{SessionStatus, FEATURE_COUNT, WINDOW_SIZE};
    use coral_exchange::PaperExchange;
    use coral_model::{GradientBoostedForest, Scaler, TreeNode};
    use coral_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn leaf(value: f64) -> TreeNode {
        TreeNode {
            feature_idx: None,
            threshold: None,
            value,
            left: None,
            right: None,
        }
    }

    /// Constant-Hold classifier; cycle tests inject signals directly.
    pub(crate) fn hold_classifier() -> Classifier {
        let n = WINDOW_SIZE * FEATURE_COUNT;
        let forest = GradientBoostedForest {
            feature_count: n,
            base_score: 0.0,
            learning_rate: 1.0,
            class_trees: vec![vec![leaf(0.0)], vec![leaf(1.0)], vec![leaf(0.0)]],
        };
        let scaler = Scaler::new(vec![0.0; n], vec![1.0; n]).unwrap();
        Classifier::new(scaler, forest).unwrap()
    }

    pub(crate) fn permissive_risk() -> RiskConfig {
        RiskConfig {
            allow_buy: true,
            allow_sell: true,
            budget: dec!(100),
            tolerance: dec!(0.05),
            hold_time: 48 * 3600,
            max_trade: 3,
        }
    }

    pub(crate) fn engine_with(
        exchange: Arc<PaperExchange>,
        store: Arc<MemoryStore>,
    ) -> Engine {
        Engine::new(
            exchange,
            store,
            hold_classifier(),
            EngineConfig::default(),
        )
    }

    async fn open_position(
        store: &MemoryStore,
        symbol: &str,
        buy_price: Decimal,
        buy_timestamp: i64,
    ) -> Session {
        store
            .insert_session(NewSession {
                symbol: symbol.to_string(),
                buy_price,
                quantity: dec!(1),
                buy_timestamp,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_entries_respect_slots_and_ownership() {
        let exchange = Arc::new(PaperExchange::new(dec!(1000)));
        for symbol in ["AUSDT", "CUSDT", "DUSDT"] {
            exchange.set_price(symbol, dec!(10));
        }
        let store = Arc::new(MemoryStore::new(permissive_risk()));
        let now = Utc::now().timestamp();
        open_position(&store, "AUSDT", dec!(10), now).await;
        open_position(&store, "BUSDT", dec!(10), now).await;

        let engine = engine_with(exchange.clone(), store.clone());
        let report = engine
            .apply_signals(vec![
                ("AUSDT".to_string(), Signal::Buy),
                ("CUSDT".to_string(), Signal::Buy),
                ("DUSDT".to_string(), Signal::Buy),
            ])
            .await
            .unwrap();

        // Two of three slots taken and A already owned: only C enters.
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].symbol, "CUSDT");
        assert_eq!(store.open_sessions().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_entries_when_buying_disallowed() {
        let exchange = Arc::new(PaperExchange::new(dec!(1000)));
        exchange.set_price("CUSDT", dec!(10));
        let mut risk = permissive_risk();
        risk.allow_buy = false;
        let store = Arc::new(MemoryStore::new(risk));

        let engine = engine_with(exchange, store.clone());
        let report = engine
            .apply_signals(vec![("CUSDT".to_string(), Signal::Buy)])
            .await
            .unwrap();

        assert!(report.fills.is_empty());
        assert!(store.open_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_entries_when_quote_balance_below_budget() {
        let exchange = Arc::new(PaperExchange::new(dec!(50)));
        exchange.set_price("CUSDT", dec!(10));
        let store = Arc::new(MemoryStore::new(permissive_risk()));

        let engine = engine_with(exchange, store.clone());
        let report = engine
            .apply_signals(vec![("CUSDT".to_string(), Signal::Buy)])
            .await
            .unwrap();

        assert!(report.fills.is_empty());
        assert!(store.open_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_sizes_to_budget_and_lot() {
        let exchange = Arc::new(PaperExchange::new(dec!(1000)));
        exchange.set_price("CUSDT", dec!(100));
        exchange.set_min_qty("CUSDT", dec!(0.01));
        let mut risk = permissive_risk();
        risk.budget = dec!(250);
        let store = Arc::new(MemoryStore::new(risk));

        let engine = engine_with(exchange, store.clone());
        let report = engine
            .apply_signals(vec![("CUSDT".to_string(), Signal::Buy)])
            .await
            .unwrap();

        assert_eq!(report.fills[0].quantity, dec!(2.5));
        let session = store
            .session_for_symbol("CUSDT")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.quantity, dec!(2.5));
        assert_eq!(session.buy_price, dec!(100));
    }

    #[tokio::test]
    async fn test_signal_exit_requires_profit_and_min_hold() {
        let exchange = Arc::new(PaperExchange::new(dec!(0)));
        exchange.set_price("AUSDT", dec!(95));
        exchange.set_balance("A", dec!(1));
        let store = Arc::new(MemoryStore::new(permissive_risk()));
        let now = Utc::now().timestamp();
        let session = open_position(&store, "AUSDT", dec!(100), now - 4 * 3600).await;

        let engine = engine_with(exchange.clone(), store.clone());

        // Underwater: the sell signal is ignored.
        let report = engine
            .apply_signals(vec![("AUSDT".to_string(), Signal::Sell)])
            .await
            .unwrap();
        assert!(report.closed.is_empty());

        // In profit but held under three hours: still ignored.
        exchange.set_price("AUSDT", dec!(110));
        store.set_risk_config(permissive_risk());
        let fresh = open_position(&store, "BUSDT", dec!(100), now - 3600).await;
        exchange.set_price("BUSDT", dec!(110));
        exchange.set_balance("B", dec!(1));
        let report = engine
            .apply_signals(vec![("BUSDT".to_string(), Signal::Sell)])
            .await
            .unwrap();
        assert!(report.closed.is_empty());
        assert!(store
            .session_for_symbol("BUSDT")
            .await
            .unwrap()
            .is_some());
        assert_eq!(fresh.id, 2);

        // In profit and past the minimum hold: closes.
        let report = engine
            .apply_signals(vec![("AUSDT".to_string(), Signal::Sell)])
            .await
            .unwrap();
        assert_eq!(report.closed.len(), 1);
        assert_eq!(report.closed[0].id, session.id);
        assert_eq!(report.closed[0].sell_price, Some(dec!(110)));
    }

    #[tokio::test]
    async fn test_exit_skipped_when_selling_disallowed() {
        let exchange = Arc::new(PaperExchange::new(dec!(0)));
        exchange.set_price("AUSDT", dec!(110));
        exchange.set_balance("A", dec!(1));
        let mut risk = permissive_risk();
        risk.allow_sell = false;
        let store = Arc::new(MemoryStore::new(risk));
        let now = Utc::now().timestamp();
        open_position(&store, "AUSDT", dec!(100), now - 4 * 3600).await;

        let engine = engine_with(exchange, store.clone());
        let report = engine
            .apply_signals(vec![("AUSDT".to_string(), Signal::Sell)])
            .await
            .unwrap();

        assert!(report.closed.is_empty());
        assert!(store.session_for_symbol("AUSDT").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_entry_failure_does_not_abort_cycle() {
        let exchange = Arc::new(PaperExchange::new(dec!(1000)));
        // No price posted for XUSDT: its ticker call fails.
        exchange.set_price("CUSDT", dec!(10));
        let store = Arc::new(MemoryStore::new(permissive_risk()));

        let engine = engine_with(exchange, store.clone());
        let report = engine
            .apply_signals(vec![
                ("XUSDT".to_string(), Signal::Buy),
                ("CUSDT".to_string(), Signal::Buy),
            ])
            .await
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "XUSDT");
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].symbol, "CUSDT");
    }

    #[tokio::test]
    async fn test_cycle_gates_use_the_starting_snapshot() {
        let exchange = Arc::new(PaperExchange::new(dec!(1000)));
        exchange.set_price("CUSDT", dec!(10));
        let store = Arc::new(MemoryStore::new(permissive_risk()));
        let engine = engine_with(exchange, store.clone());

        // The operator flips the gate after the cycle took its snapshot;
        // the entry pass must still see the snapshot's values.
        let snapshot = permissive_risk();
        let mut locked = permissive_risk();
        locked.allow_buy = false;
        store.set_risk_config(locked);

        let report = engine
            .apply_signals_with(&snapshot, vec![("CUSDT".to_string(), Signal::Buy)])
            .await
            .unwrap();
        assert_eq!(report.fills.len(), 1);
    }

    #[test]
    fn test_min_hold_boundary_is_strict() {
        let exchange = Arc::new(PaperExchange::new(dec!(0)));
        let store = Arc::new(MemoryStore::default());
        let engine = engine_with(exchange, store);
        let session = Session {
            id: 1,
            symbol: "AUSDT".to_string(),
            buy_price: dec!(100),
            quantity: dec!(1),
            buy_timestamp: 0,
            status: SessionStatus::Open,
            sell_price: None,
            sell_timestamp: None,
        };

        let min_hold = engine.config.min_hold_secs;
        assert!(!engine.past_min_hold(&session, min_hold));
        assert!(engine.past_min_hold(&session, min_hold + 1));
    }

    #[tokio::test]
    async fn test_base_asset_derivation() {
        let exchange = Arc::new(PaperExchange::new(dec!(0)));
        let store = Arc::new(MemoryStore::default());
        let engine = engine_with(exchange, store);

        assert_eq!(engine.base_asset("BTCUSDT").unwrap(), "BTC");
        assert!(engine.base_asset("BTCEUR").is_err());
        assert!(engine.base_asset("USDT").is_err());
    }
}
