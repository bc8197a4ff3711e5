//! Folding closed sessions into a reportable summary.

use rust_decimal::Decimal;
use serde::Serialize;

use coral_core::types::Session;

/// One closed session's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
    pub holding_secs: i64,
}

/// Aggregate of everything closed in the look-back window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    pub outcomes: Vec<SymbolOutcome>,
    pub total_profit: Decimal,
}

impl TradeSummary {
    pub fn wins(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.profit > Decimal::ZERO)
            .count()
    }
}

/// Summarize closed sessions; `None` when nothing closed, so quiet
/// periods produce no notification at all.
///
/// Open sessions are skipped: a session with no exit fill has no outcome
/// to report yet.
pub fn summarize(closed: &[Session]) -> Option<TradeSummary> {
    let outcomes: Vec<SymbolOutcome> = closed
        .iter()
        .filter_map(|session| {
            let sell_price = session.sell_price?;
            Some(SymbolOutcome {
                symbol: session.symbol.clone(),
                buy_price: session.buy_price,
                sell_price,
                profit: session.profit(sell_price),
                profit_percent: session.profit_percent(sell_price),
                holding_secs: session.holding_secs(0),
            })
        })
        .collect();

    if outcomes.is_empty() {
        return None;
    }
    let total_profit = outcomes.iter().map(|o| o.profit).sum();
    Some(TradeSummary {
        outcomes,
        total_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use coral_core::types::SessionStatus;
    use rust_decimal_macros::dec;

    fn closed_session(symbol: &str, buy: Decimal, sell: Decimal) -> Session {
        Session {
            id: 1,
            symbol: symbol.to_string(),
            buy_price: buy,
            quantity: dec!(2),
            buy_timestamp: 1_000,
            status: SessionStatus::Closed,
            sell_price: Some(sell),
            sell_timestamp: Some(4_600),
        }
    }

    #[test]
    fn test_summarize_aggregates_profit() {
        let sessions = vec![
            closed_session("AUSDT", dec!(100), dec!(110)),
            closed_session("BUSDT", dec!(50), dec!(45)),
        ];
        let summary = summarize(&sessions).unwrap();

        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.outcomes[0].profit, dec!(20));
        assert_eq!(summary.outcomes[0].profit_percent, dec!(10));
        assert_eq!(summary.outcomes[1].profit, dec!(-10));
        assert_eq!(summary.total_profit, dec!(10));
        assert_eq!(summary.wins(), 1);
        assert_eq!(summary.outcomes[0].holding_secs, 3_600);
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_skips_sessions_without_exit() {
        let mut open = closed_session("AUSDT", dec!(100), dec!(110));
        open.status = SessionStatus::Open;
        open.sell_price = None;
        open.sell_timestamp = None;
        assert!(summarize(&[open]).is_none());
    }
}
