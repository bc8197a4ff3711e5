//! Operator notifications.
//!
//! [`summarize`] folds recently closed sessions into a [`TradeSummary`];
//! [`SlackNotifier`] posts it to an incoming-webhook URL. Delivery is
//! best-effort: a failed post is logged and dropped, never propagated
//! into a trading cycle.

mod slack;
mod summary;

pub use slack::SlackNotifier;
pub use summary::{summarize, SymbolOutcome, TradeSummary};
