//! Core data types for the trading bot.

mod order;
mod price;
mod risk;
mod session;
mod signal;
mod window;

pub use order::{OrderFill, Side};
pub use price::{FeatureRow, PricePoint, FEATURE_COUNT};
pub use risk::RiskConfig;
pub use session::{NewSession, Session, SessionStatus};
pub use signal::Signal;
pub use window::{Window, WINDOW_SIZE};
