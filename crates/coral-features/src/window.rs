//! Sliding classifier windows over a feature series.

use coral_core::error::FeatureError;
use coral_core::types::{FeatureRow, Window, WINDOW_SIZE};

/// Lazily yield every fixed-size window of consecutive rows.
///
/// For a series of length `L` this produces exactly `L - size` windows
/// (window `i` covers rows `[i, i + size)`), matching the training layout
/// where window `i` is paired with the label of row `i + size`. The most
/// recent row is therefore never part of any window.
pub fn sliding_windows(
    rows: &[FeatureRow],
    size: usize,
) -> impl Iterator<Item = &[FeatureRow]> + '_ {
    let count = rows.len().saturating_sub(size);
    (0..count).map(move |i| &rows[i..i + size])
}

/// The last (most recent) valid classifier window of a series, used at
/// decision time.
///
/// Fails when the series is too short or when the window still contains
/// rows with missing indicators.
pub fn last_window(rows: &[FeatureRow]) -> Result<Window, FeatureError> {
    let count = rows.len().saturating_sub(WINDOW_SIZE);
    if count == 0 {
        return Err(FeatureError::InsufficientHistory {
            required: WINDOW_SIZE + 1,
            available: rows.len(),
        });
    }
    Window::try_from_rows(&rows[count - 1..count - 1 + WINDOW_SIZE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use coral_core::types::PricePoint;

    fn complete_rows(len: usize) -> Vec<FeatureRow> {
        (0..len)
            .map(|i| {
                let mut row = FeatureRow::from_price(&PricePoint::new(i as i64, 100.0, 1.0));
                row.bollinger_upper = Some(0.0);
                row.bollinger_lower = Some(0.0);
                row.bollinger_width = Some(0.0);
                row.bollinger_pct_b = Some(0.0);
                row.macd = Some(0.0);
                row.macd_signal = Some(0.0);
                row.macd_hist = Some(0.0);
                row.rsi = Some(0.0);
                row.rolling_mean_12h = Some(0.0);
                row.rolling_std_12h = Some(0.0);
                row.rolling_mean_36h = Some(0.0);
                row.rolling_std_36h = Some(0.0);
                row.rolling_mean_96h = Some(0.0);
                row.rolling_std_96h = Some(0.0);
                row.vwma_4h = Some(0.0);
                row.vwma_24h = Some(0.0);
                row.vwma_96h = Some(0.0);
                row.trend = Some(0.0);
                row
            })
            .collect()
    }

    #[test]
    fn test_window_count_is_len_minus_size() {
        let rows = complete_rows(100);
        let windows: Vec<_> = sliding_windows(&rows, WINDOW_SIZE).collect();
        assert_eq!(windows.len(), 100 - WINDOW_SIZE);
    }

    #[test]
    fn test_windows_are_consecutive_and_gap_free() {
        let rows = complete_rows(40);
        for (i, window) in sliding_windows(&rows, WINDOW_SIZE).enumerate() {
            assert_eq!(window.len(), WINDOW_SIZE);
            for (j, row) in window.iter().enumerate() {
                assert_eq!(row.timestamp, (i + j) as i64);
            }
        }
    }

    #[test]
    fn test_iterator_is_restartable() {
        let rows = complete_rows(30);
        let first: Vec<_> = sliding_windows(&rows, WINDOW_SIZE).collect();
        let second: Vec<_> = sliding_windows(&rows, WINDOW_SIZE).collect();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_too_short_series_yields_nothing() {
        let rows = complete_rows(WINDOW_SIZE);
        assert_eq!(sliding_windows(&rows, WINDOW_SIZE).count(), 0);
        assert!(last_window(&rows).is_err());
    }

    #[test]
    fn test_last_window_excludes_most_recent_row() {
        let rows = complete_rows(50);
        let window = last_window(&rows).unwrap();
        // The final window ends one row before the series does.
        assert_eq!(window.last_timestamp(), 48);
    }

    #[test]
    fn test_last_window_rejects_missing_indicators() {
        let mut rows = complete_rows(50);
        rows[40].rsi = None;
        assert!(last_window(&rows).is_err());
    }
}
