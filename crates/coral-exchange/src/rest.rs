//! Binance-style REST exchange adapter.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

use coral_core::error::ExchangeError;
use coral_core::traits::Exchange;
use coral_core::types::{OrderFill, PricePoint, Side};

/// Connection settings for the REST adapter.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout; a stuck call for one symbol must not stall the
    /// rest of a cycle.
    pub timeout_secs: u64,
    /// When set, order placement is short-circuited with a synthetic fill
    /// and nothing reaches the exchange.
    pub dry_run: bool,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            api_key: None,
            timeout_secs: 10,
            dry_run: true,
        }
    }
}

/// Spot exchange adapter over the Binance REST API surface.
pub struct RestExchange {
    client: reqwest::Client,
    config: RestConfig,
}

impl RestExchange {
    pub fn new(config: RestConfig) -> Result<Self, ExchangeError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(key) = &config.api_key {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(key)
                .map_err(|e| ExchangeError::Api(format!("invalid api key: {e}")))?;
            headers.insert("X-MBX-APIKEY", value);
            builder = builder.default_headers(headers);
        }
        let client = builder
            .build()
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ExchangeError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_request_error(self.config.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(ExchangeError::Api(format!("{path}: {status}: {body}")));
        }
        serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError> {
        if self.config.dry_run {
            info!(%symbol, %side, %quantity, "dry run: skipping order placement");
            return Ok(OrderFill {
                order_id: "dry-run".to_string(),
                symbol: symbol.to_string(),
                side,
                quantity,
                price: None,
                timestamp: Utc::now().timestamp(),
            });
        }

        let url = format!("{}/api/v3/order", self.config.base_url);
        let side_str = side.to_string();
        let qty_str = quantity.normalize().to_string();
        let response = self
            .client
            .post(&url)
            .query(&[
                ("symbol", symbol),
                ("side", side_str.as_str()),
                ("type", "MARKET"),
                ("quantity", qty_str.as_str()),
            ])
            .send()
            .await
            .map_err(map_request_error(self.config.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        if status.is_client_error() {
            return Err(ExchangeError::Rejected(body));
        }
        if !status.is_success() {
            return Err(ExchangeError::Api(format!("order: {status}: {body}")));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))?;
        let order_id = value
            .get("orderId")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let price = value
            .get("fills")
            .and_then(Value::as_array)
            .and_then(|fills| fills.first())
            .and_then(|fill| fill.get("price"))
            .and_then(Value::as_str)
            .and_then(|p| Decimal::from_str(p).ok());

        debug!(%symbol, %side, %quantity, order_id, "market order filled");

        Ok(OrderFill {
            order_id,
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            timestamp: Utc::now().timestamp(),
        })
    }
}

#[async_trait]
impl Exchange for RestExchange {
    async fn ticker(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let value = self
            .get_json("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        decimal_field(&value, "price")
    }

    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<PricePoint>, ExchangeError> {
        let value = self
            .get_json(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        let rows = value
            .as_array()
            .ok_or_else(|| ExchangeError::Parse("klines: expected array".to_string()))?;
        rows.iter().map(parse_kline).collect()
    }

    async fn balances(&self) -> Result<HashMap<String, Decimal>, ExchangeError> {
        let value = self.get_json("/api/v3/account", &[]).await?;
        let entries = value
            .get("balances")
            .and_then(Value::as_array)
            .ok_or_else(|| ExchangeError::Parse("account: missing balances".to_string()))?;

        let mut balances = HashMap::with_capacity(entries.len());
        for entry in entries {
            let asset = entry
                .get("asset")
                .and_then(Value::as_str)
                .ok_or_else(|| ExchangeError::Parse("balance: missing asset".to_string()))?;
            let free = decimal_field(entry, "free")?;
            balances.insert(asset.to_string(), free);
        }
        Ok(balances)
    }

    async fn min_qty(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let value = self
            .get_json("/api/v3/exchangeInfo", &[("symbol", symbol.to_string())])
            .await?;
        let filters = value
            .get("symbols")
            .and_then(Value::as_array)
            .and_then(|symbols| symbols.first())
            .and_then(|info| info.get("filters"))
            .and_then(Value::as_array)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;

        for filter in filters {
            if filter.get("filterType").and_then(Value::as_str) == Some("LOT_SIZE") {
                return decimal_field(filter, "minQty");
            }
        }
        Err(ExchangeError::Parse(format!(
            "{symbol}: no LOT_SIZE filter in exchange info"
        )))
    }

    async fn market_buy(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError> {
        self.place_order(symbol, Side::Buy, quantity).await
    }

    async fn market_sell(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<OrderFill, ExchangeError> {
        self.place_order(symbol, Side::Sell, quantity).await
    }

    fn name(&self) -> &str {
        "binance-rest"
    }
}

fn map_request_error(timeout_secs: u64) -> impl Fn(reqwest::Error) -> ExchangeError {
    move |e| {
        if e.is_timeout() {
            ExchangeError::Timeout(timeout_secs)
        } else {
            ExchangeError::Network(e.to_string())
        }
    }
}

fn decimal_field(value: &Value, field: &str) -> Result<Decimal, ExchangeError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ExchangeError::Parse(format!("missing field: {field}")))
        .and_then(|s| {
            Decimal::from_str(s).map_err(|e| ExchangeError::Parse(format!("{field}: {e}")))
        })
}

/// One kline row: `[open_time, open, high, low, close, volume, ...]`,
/// prices as strings. Only timestamp, close and volume are kept.
fn parse_kline(row: &Value) -> Result<PricePoint, ExchangeError> {
    let cells = row
        .as_array()
        .ok_or_else(|| ExchangeError::Parse("kline: expected array row".to_string()))?;
    if cells.len() < 6 {
        return Err(ExchangeError::Parse(format!(
            "kline: expected at least 6 cells, got {}",
            cells.len()
        )));
    }
    let timestamp = cells[0]
        .as_i64()
        .ok_or_else(|| ExchangeError::Parse("kline: bad open time".to_string()))?;
    let close = str_cell_f64(&cells[4], "close")?;
    let volume = str_cell_f64(&cells[5], "volume")?;
    Ok(PricePoint::new(timestamp, close, volume))
}

fn str_cell_f64(cell: &Value, name: &str) -> Result<f64, ExchangeError> {
    cell.as_str()
        .ok_or_else(|| ExchangeError::Parse(format!("kline: {name} not a string")))?
        .parse::<f64>()
        .map_err(|e| ExchangeError::Parse(format!("kline: {name}: {e}")))
}
