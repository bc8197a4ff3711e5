//! In-memory paper exchange for dry runs and engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use coral_core::error::ExchangeError;
use coral_core::traits::Exchange;
use coral_core::types::{OrderFill, PricePoint, Side};

#[derive(Default)]
struct Inner {
    balances: HashMap<String, Decimal>,
    prices: HashMap<String, Decimal>,
    lot_sizes: HashMap<String, Decimal>,
    /// Keyed by (symbol, interval).
    klines: HashMap<(String, String), Vec<PricePoint>>,
    fills: Vec<OrderFill>,
    next_order_id: u64,
}

/// Exchange that fills market orders instantly at the posted price and
/// settles against in-memory balances.
pub struct PaperExchange {
    inner: Arc<Mutex<Inner>>,
    quote_asset: String,
}

impl PaperExchange {
    pub fn new(quote_balance: Decimal) -> Self {
        let exchange = Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            quote_asset: "USDT".to_string(),
        };
        exchange.set_balance("USDT", quote_balance);
        exchange
    }

    pub fn with_quote_asset(mut self, asset: &str) -> Self {
        let balance = {
            let mut inner = self.inner.lock().unwrap();
            inner.balances.remove(&self.quote_asset).unwrap_or_default()
        };
        self.quote_asset = asset.to_string();
        self.set_balance(asset, balance);
        self
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.prices.insert(symbol.to_string(), price);
    }

    pub fn set_balance(&self, asset: &str, amount: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.balances.insert(asset.to_string(), amount);
    }

    pub fn set_min_qty(&self, symbol: &str, lot: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.lot_sizes.insert(symbol.to_string(), lot);
    }

    pub fn set_klines(&self, symbol: &str, interval: &str, points: Vec<PricePoint>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .klines
            .insert((symbol.to_string(), interval.to_string()), points);
    }

    /// All fills recorded so far, in order.
    pub fn fills(&self) -> Vec<OrderFill> {
        self.inner.lock().unwrap().fills.clone()
    }

    fn base_asset(&self, symbol: &str) -> Result<String, ExchangeError> {
        symbol
            .strip_suffix(self.quote_asset.as_str())
            .filter(|base| !base.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))
    }

    fn fill(&self, symbol: &str, side: Side, quantity: Decimal) -> Result<OrderFill, ExchangeError> {
        let base = self.base_asset(symbol)?;
        let mut inner = self.inner.lock().unwrap();

        let price = *inner
            .prices
            .get(symbol)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;
        let cost = price * quantity;

        match side {
            Side::Buy => {
                let quote = inner
                    .balances
                    .get(&self.quote_asset)
                    .copied()
                    .unwrap_or_default();
                if cost > quote {
                    return Err(ExchangeError::InsufficientFunds {
                        required: cost,
                        available: quote,
                    });
                }
                *inner.balances.entry(self.quote_asset.clone()).or_default() -= cost;
                *inner.balances.entry(base).or_default() += quantity;
            }
            Side::Sell => {
                let held = inner.balances.get(&base).copied().unwrap_or_default();
                if quantity > held {
                    return Err(ExchangeError::InsufficientFunds {
                        required: quantity,
                        available: held,
                    });
                }
                *inner.balances.entry(base).or_default() -= quantity;
                *inner.balances.entry(self.quote_asset.clone()).or_default() += cost;
            }
        }

        inner.next_order_id += 1;
        let fill = OrderFill {
            order_id: format!("paper-{}", inner.next_order_id),
            symbol: symbol.to_string(),
            side,
            quantity,
            price: Some(price),
            timestamp: Utc::now().timestamp(),
        };
        inner.fills.push(fill.clone());
        info!(%symbol, %side, %quantity, %price, "paper fill");
        Ok(fill)
    }
}

#[async_trait]
impl Exchange for PaperExchange {
    async fn ticker(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let inner = self.inner.lock().unwrap();
        inner
            .prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))
    }

    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<PricePoint>, ExchangeError> {
        let inner = self.inner.lock().unwrap();
        let points = inner
            .klines
            .get(&(symbol.to_string(), interval.to_string()))
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;
        let start = points.len().saturating_sub(limit);
        Ok(points[start..].to_vec())
    }

    async fn balances(&self) -> Result<HashMap<String, Decimal>, ExchangeError> {
        Ok(self.inner.lock().unwrap().balances.clone())
    }

    async fn min_qty(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .lot_sizes
            .get(symbol)
            .copied()
            .unwrap_or_else(|| Decimal::new(1, 3)))
    }

    async fn market_buy(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError> {
        self.fill(symbol, Side::Buy, quantity)
    }

    async fn market_sell(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError> {
        self.fill(symbol, Side::Sell, quantity)
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_buy_moves_balances() {
        let exchange = PaperExchange::new(dec!(1000));
        exchange.set_price("BTCUSDT", dec!(100));

        let fill = exchange.market_buy("BTCUSDT", dec!(2)).await.unwrap();
        assert_eq!(fill.price, Some(dec!(100)));

        let balances = exchange.balances().await.unwrap();
        assert_eq!(balances["USDT"], dec!(800));
        assert_eq!(balances["BTC"], dec!(2));
    }

    #[tokio::test]
    async fn test_buy_rejected_without_quote_funds() {
        let exchange = PaperExchange::new(dec!(50));
        exchange.set_price("BTCUSDT", dec!(100));

        let err = exchange.market_buy("BTCUSDT", dec!(1)).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_sell_requires_base_holdings() {
        let exchange = PaperExchange::new(dec!(1000));
        exchange.set_price("ETHUSDT", dec!(10));

        let err = exchange.market_sell("ETHUSDT", dec!(1)).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientFunds { .. }));

        exchange.set_balance("ETH", dec!(3));
        let fill = exchange.market_sell("ETHUSDT", dec!(1)).await.unwrap();
        assert_eq!(fill.side, Side::Sell);

        let balances = exchange.balances().await.unwrap();
        assert_eq!(balances["ETH"], dec!(2));
        assert_eq!(balances["USDT"], dec!(1010));
    }

    #[tokio::test]
    async fn test_klines_respects_limit() {
        let exchange = PaperExchange::new(dec!(0));
        let points: Vec<PricePoint> = (0..10)
            .map(|i| PricePoint::new(i * 3_600_000, 100.0 + i as f64, 1.0))
            .collect();
        exchange.set_klines("BTCUSDT", "1h", points);

        let recent = exchange.klines("BTCUSDT", "1h", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].close, 107.0);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let exchange = PaperExchange::new(dec!(100));
        assert!(matches!(
            exchange.ticker("NOPEUSDT").await,
            Err(ExchangeError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fills_are_recorded_in_order() {
        let exchange = PaperExchange::new(dec!(1000));
        exchange.set_price("BTCUSDT", dec!(10));

        exchange.market_buy("BTCUSDT", dec!(1)).await.unwrap();
        exchange.market_sell("BTCUSDT", dec!(1)).await.unwrap();

        let fills = exchange.fills();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].side, Side::Buy);
        assert_eq!(fills[1].side, Side::Sell);
        assert_eq!(fills[0].order_id, "paper-1");
    }
}
