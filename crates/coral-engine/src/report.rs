//! Cycle outcome reporting.

use coral_core::types::{OrderFill, Session, Signal};

/// What one cycle did: every signal scanned, every fill placed, every
/// per-symbol failure swallowed along the way.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Signal per scanned symbol, in scan order. Empty when the scan was
    /// skipped because the position book was already full.
    pub signals: Vec<(String, Signal)>,
    /// Fills placed this cycle, entries and exits alike.
    pub fills: Vec<OrderFill>,
    /// Sessions closed this cycle.
    pub closed: Vec<Session>,
    /// Per-symbol failures, as (symbol, message).
    pub errors: Vec<(String, String)>,
}

impl CycleReport {
    pub fn record_error(&mut self, symbol: &str, message: impl ToString) {
        self.errors.push((symbol.to_string(), message.to_string()));
    }

    pub fn is_quiet(&self) -> bool {
        self.fills.is_empty() && self.closed.is_empty() && self.errors.is_empty()
    }
}
