//! Market order types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Result of a filled market order, as echoed by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFill {
    /// Exchange-issued order identifier
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    /// Requested quantity in base asset
    pub quantity: Decimal,
    /// Average fill price when the exchange reports one
    pub price: Option<Decimal>,
    /// Fill time, Unix seconds
    pub timestamp: i64,
}
