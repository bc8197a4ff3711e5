//! Execution engine.
//!
//! Two cycles drive the system. The low-frequency trade cycle scans the
//! symbol universe for model signals and opens or closes positions under
//! the operator's risk configuration. The high-frequency guard cycle
//! watches open positions for drawdown and expiry exits. Both treat
//! per-symbol failures as data: logged, reported, never fatal to the
//! cycle.

mod engine;
mod guards;
mod report;
mod sizing;

pub use engine::{Engine, EngineConfig};
pub use report::CycleReport;
pub use sizing::{calculate_max_qty, calculate_max_sell_qty};
