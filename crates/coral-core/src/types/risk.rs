//! Risk configuration: the singleton row gating every decision cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operator-controlled risk settings.
///
/// Read once at the start of every cycle and passed by value, so a
/// mid-cycle operator update cannot produce inconsistent decisions within
/// one cycle. The engine never writes this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Gate for opening new positions
    pub allow_buy: bool,
    /// Gate for the signal-driven exit path
    pub allow_sell: bool,
    /// Quote-currency amount spent per new entry
    pub budget: Decimal,
    /// Fractional drawdown that triggers the safety exit (0.05 = 5%)
    pub tolerance: Decimal,
    /// Forced-exit horizon in seconds
    pub hold_time: i64,
    /// Maximum number of concurrently open sessions
    pub max_trade: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            allow_buy: false,
            allow_sell: false,
            budget: Decimal::from(100),
            tolerance: Decimal::new(5, 2),
            hold_time: 48 * 3600,
            max_trade: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_disallows_trading() {
        let config = RiskConfig::default();
        assert!(!config.allow_buy);
        assert!(!config.allow_sell);
        assert_eq!(config.tolerance, dec!(0.05));
    }
}
