//! Exchange adapter trait.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ExchangeError;
use crate::types::{OrderFill, PricePoint};

/// Spot exchange operations the engine depends on.
///
/// Every call may fail with a transient network error or a rejected order;
/// the engine isolates those failures per symbol. Implementations must
/// bound each call with a timeout so one stuck symbol cannot stall a cycle.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Latest traded price for a symbol.
    async fn ticker(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    /// Most recent `limit` candlesticks at the given interval
    /// (e.g. "1h", "1m"), oldest first.
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<PricePoint>, ExchangeError>;

    /// Free balance per asset.
    async fn balances(&self) -> Result<HashMap<String, Decimal>, ExchangeError>;

    /// Exchange lot-size constraint: minimum tradable quantity increment.
    async fn min_qty(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    /// Place a market buy for `quantity` of the base asset.
    async fn market_buy(&self, symbol: &str, quantity: Decimal)
        -> Result<OrderFill, ExchangeError>;

    /// Place a market sell for `quantity` of the base asset.
    async fn market_sell(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError>;

    /// Adapter name for logging.
    fn name(&self) -> &str;
}
