//! Trade sessions: one open-or-closed spot position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a session. OPEN transitions to CLOSED exactly once,
/// on the exit fill; a session is never re-opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// A recorded trade: entry fill, and exit fill once closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-issued identifier
    pub id: i64,
    /// Symbol, e.g. "BTCUSDT"
    pub symbol: String,
    /// Entry fill price
    pub buy_price: Decimal,
    /// Entry quantity in base asset
    pub quantity: Decimal,
    /// Entry time, Unix seconds
    pub buy_timestamp: i64,
    pub status: SessionStatus,
    /// Exit fill price, present once closed
    pub sell_price: Option<Decimal>,
    /// Exit time, Unix seconds, present once closed
    pub sell_timestamp: Option<i64>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Unrealized (open) or realized (closed) profit against a price.
    pub fn profit(&self, current_price: Decimal) -> Decimal {
        let reference = match self.status {
            SessionStatus::Closed => self.sell_price.unwrap_or(current_price),
            SessionStatus::Open => current_price,
        };
        (reference - self.buy_price) * self.quantity
    }

    /// Profit as a percentage of the entry cost.
    pub fn profit_percent(&self, current_price: Decimal) -> Decimal {
        let cost = self.buy_price * self.quantity;
        if cost.is_zero() {
            return Decimal::ZERO;
        }
        self.profit(current_price) / cost * Decimal::from(100)
    }

    /// Seconds this session has been (or was) held.
    pub fn holding_secs(&self, now: i64) -> i64 {
        match self.sell_timestamp {
            Some(sold) => sold - self.buy_timestamp,
            None => now - self.buy_timestamp,
        }
    }

    pub fn buy_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.buy_timestamp, 0)
    }
}

/// Fields for inserting a freshly opened session; the store issues the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub symbol: String,
    pub buy_price: Decimal,
    pub quantity: Decimal,
    pub buy_timestamp: i64,
}
