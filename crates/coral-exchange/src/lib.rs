//! Exchange adapters.
//!
//! [`RestExchange`] talks to a Binance-style spot REST API with bounded
//! per-request timeouts; [`PaperExchange`] keeps balances and prices in
//! memory for dry runs and engine tests. Both implement the
//! `coral_core::Exchange` trait.

mod paper;
mod rest;

pub use paper::PaperExchange;
pub use rest::{RestConfig, RestExchange};
