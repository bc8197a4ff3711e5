//! Feature pipeline, windowing and labeling.
//!
//! This crate turns a raw price series into indicator-enriched feature rows
//! ([`pipeline::enrich`]), cuts those into fixed-size classifier windows
//! ([`window::sliding_windows`]), and labels historical series for training
//! ([`label::label_series`]). All of it is pure, deterministic and
//! synchronous; rows without enough history carry `None` instead of a value.

pub mod label;
pub mod pipeline;
pub mod window;

pub use label::{label_series, LabelParams};
pub use pipeline::{enrich, macd_buy_signal, macd_sell_signal};
pub use window::{last_window, sliding_windows};
