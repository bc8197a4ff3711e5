//! Core types and traits for the coral trading bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (PricePoint, FeatureRow, Window)
//! - Trade session and risk configuration types
//! - The ternary trade signal
//! - Traits for the exchange adapter and position store

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoralError, CoralResult};
pub use traits::*;
pub use types::*;
