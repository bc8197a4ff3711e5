//! Price series and derived feature rows.

use serde::{Deserialize, Serialize};

/// Number of values each feature row contributes to the classifier input:
/// close, volume and the eighteen indicator columns, in the fixed order
/// produced by [`FeatureRow::features`].
pub const FEATURE_COUNT: usize = 20;

/// One resampled time step of a symbol's price series.
///
/// Immutable once ingested; ordered by timestamp, one per symbol per
/// interval. Only close and volume are consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }
}

/// A price point enriched with technical-indicator values.
///
/// Every indicator is `None` until its rolling/exponential window has seen
/// enough history. `None` means "not enough history", never zero; consumers
/// must refuse to compute on missing values rather than coerce them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: i64,
    pub close: f64,
    pub volume: f64,

    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_width: Option<f64>,
    pub bollinger_pct_b: Option<f64>,

    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,

    pub rsi: Option<f64>,

    pub rolling_mean_12h: Option<f64>,
    pub rolling_std_12h: Option<f64>,
    pub rolling_mean_36h: Option<f64>,
    pub rolling_std_36h: Option<f64>,
    pub rolling_mean_96h: Option<f64>,
    pub rolling_std_96h: Option<f64>,

    pub vwma_4h: Option<f64>,
    pub vwma_24h: Option<f64>,
    pub vwma_96h: Option<f64>,

    pub trend: Option<f64>,
}

impl FeatureRow {
    /// Start a row from the raw price point, all indicators missing.
    pub fn from_price(point: &PricePoint) -> Self {
        Self {
            timestamp: point.timestamp,
            close: point.close,
            volume: point.volume,
            ..Default::default()
        }
    }

    /// True when every indicator column carries a value.
    pub fn is_complete(&self) -> bool {
        self.features().is_some()
    }

    /// Flatten the row into the classifier's feature order.
    ///
    /// Returns `None` if any indicator is still missing. The order here is
    /// load-bearing: it must match the column order the model was trained
    /// on, and `FEATURE_COUNT` counts these entries.
    pub fn features(&self) -> Option<[f64; FEATURE_COUNT]> {
        Some([
            self.close,
            self.volume,
            self.bollinger_upper?,
            self.bollinger_lower?,
            self.bollinger_width?,
            self.bollinger_pct_b?,
            self.macd?,
            self.macd_signal?,
            self.macd_hist?,
            self.rsi?,
            self.rolling_mean_12h?,
            self.rolling_std_12h?,
            self.rolling_mean_36h?,
            self.rolling_std_36h?,
            self.rolling_mean_96h?,
            self.rolling_std_96h?,
            self.vwma_4h?,
            self.vwma_24h?,
            self.vwma_96h?,
            self.trend?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_row() -> FeatureRow {
        FeatureRow {
            timestamp: 1,
            close: 100.0,
            volume: 10.0,
            bollinger_upper: Some(1.0),
            bollinger_lower: Some(1.0),
            bollinger_width: Some(1.0),
            bollinger_pct_b: Some(1.0),
            macd: Some(1.0),
            macd_signal: Some(1.0),
            macd_hist: Some(1.0),
            rsi: Some(1.0),
            rolling_mean_12h: Some(1.0),
            rolling_std_12h: Some(1.0),
            rolling_mean_36h: Some(1.0),
            rolling_std_36h: Some(1.0),
            rolling_mean_96h: Some(1.0),
            rolling_std_96h: Some(1.0),
            vwma_4h: Some(1.0),
            vwma_24h: Some(1.0),
            vwma_96h: Some(1.0),
            trend: Some(1.0),
        }
    }

    #[test]
    fn test_feature_count_matches_flatten() {
        let row = complete_row();
        let features = row.features().unwrap();
        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features[0], 100.0);
        assert_eq!(features[1], 10.0);
    }

    #[test]
    fn test_incomplete_row_has_no_features() {
        let mut row = complete_row();
        row.rsi = None;
        assert!(!row.is_complete());
        assert!(row.features().is_none());
    }

    #[test]
    fn test_from_price_is_incomplete() {
        let row = FeatureRow::from_price(&PricePoint::new(5, 42.0, 7.0));
        assert_eq!(row.close, 42.0);
        assert!(!row.is_complete());
    }
}
