//! Training labels from future price movement.
//!
//! Only the offline training pipeline consumes these; the execution path
//! shares the enrichment and windowing code but never computes labels
//! online.

use coral_core::types::{FeatureRow, Signal};

/// Parameters for the future-return labeler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelParams {
    /// How many steps ahead to look for the realized return
    pub future_period: usize,
    /// Absolute fractional price change required for a non-hold label
    pub threshold: f64,
    /// Trend-feature magnitude required to confirm the direction
    pub trend_threshold: f64,
}

impl Default for LabelParams {
    fn default() -> Self {
        Self {
            future_period: 3,
            threshold: 0.02,
            trend_threshold: 0.0,
        }
    }
}

/// Label every row by its forward return, confirmed by the trend feature.
///
/// Buy when the `future_period`-step return exceeds `threshold` and the
/// trend feature exceeds `trend_threshold`; sell on the mirrored
/// conditions; hold otherwise. Rows with no future price (the series tail)
/// or no trend value label as hold.
pub fn label_series(rows: &[FeatureRow], params: &LabelParams) -> Vec<Signal> {
    (0..rows.len())
        .map(|i| label_row(rows, i, params))
        .collect()
}

fn label_row(rows: &[FeatureRow], i: usize, params: &LabelParams) -> Signal {
    let Some(future) = rows.get(i + params.future_period) else {
        return Signal::Hold;
    };
    let close = rows[i].close;
    if close == 0.0 {
        return Signal::Hold;
    }
    let Some(trend) = rows[i].trend else {
        return Signal::Hold;
    };

    let change = (future.close - close) / close;
    if change > params.threshold && trend > params.trend_threshold {
        Signal::Buy
    } else if change < -params.threshold && trend < -params.trend_threshold {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coral_core::types::PricePoint;

    fn row(close: f64, trend: Option<f64>) -> FeatureRow {
        let mut row = FeatureRow::from_price(&PricePoint::new(0, close, 1.0));
        row.trend = trend;
        row
    }

    #[test]
    fn test_buy_label_needs_rise_and_trend() {
        let rows = vec![
            row(100.0, Some(0.5)),
            row(100.0, Some(0.5)),
            row(100.0, Some(0.5)),
            row(103.0, Some(0.5)),
        ];
        let labels = label_series(&rows, &LabelParams::default());
        // +3% over 3 steps with positive trend.
        assert_eq!(labels[0], Signal::Buy);
    }

    #[test]
    fn test_rise_without_trend_confirmation_is_hold() {
        let rows = vec![
            row(100.0, Some(-0.5)),
            row(100.0, Some(0.0)),
            row(100.0, Some(0.0)),
            row(103.0, Some(0.0)),
        ];
        let labels = label_series(&rows, &LabelParams::default());
        assert_eq!(labels[0], Signal::Hold);
    }

    #[test]
    fn test_sell_label() {
        let rows = vec![
            row(100.0, Some(-0.5)),
            row(99.0, Some(0.0)),
            row(98.0, Some(0.0)),
            row(96.0, Some(0.0)),
        ];
        let labels = label_series(&rows, &LabelParams::default());
        assert_eq!(labels[0], Signal::Sell);
    }

    #[test]
    fn test_tail_rows_without_future_are_hold() {
        let rows = vec![row(100.0, Some(1.0)); 5];
        let labels = label_series(&rows, &LabelParams::default());
        assert_eq!(labels[3], Signal::Hold);
        assert_eq!(labels[4], Signal::Hold);
    }

    #[test]
    fn test_missing_trend_is_hold() {
        let rows = vec![
            row(100.0, None),
            row(110.0, None),
            row(110.0, None),
            row(110.0, None),
        ];
        let labels = label_series(&rows, &LabelParams::default());
        assert_eq!(labels[0], Signal::Hold);
    }

    #[test]
    fn test_small_move_is_hold() {
        let rows = vec![
            row(100.0, Some(1.0)),
            row(100.5, Some(1.0)),
            row(101.0, Some(1.0)),
            row(101.0, Some(1.0)),
        ];
        let labels = label_series(&rows, &LabelParams::default());
        assert_eq!(labels[0], Signal::Hold);
    }
}
