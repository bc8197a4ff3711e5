//! Fixed-size classifier input windows.

use crate::error::FeatureError;
use crate::types::{FeatureRow, FEATURE_COUNT};

/// Number of consecutive feature rows in one classifier input.
pub const WINDOW_SIZE: usize = 24;

/// An ordered run of exactly [`WINDOW_SIZE`] consecutive, complete feature
/// rows for one symbol.
///
/// Construction validates completeness, so a `Window` can always be
/// flattened into a full feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    rows: Vec<FeatureRow>,
}

impl Window {
    /// Build a window from a slice of rows.
    ///
    /// Fails if the slice is not exactly [`WINDOW_SIZE`] rows long or if any
    /// row still has missing indicator values.
    pub fn try_from_rows(rows: &[FeatureRow]) -> Result<Self, FeatureError> {
        if rows.len() != WINDOW_SIZE {
            return Err(FeatureError::WindowSize {
                expected: WINDOW_SIZE,
                actual: rows.len(),
            });
        }
        if let Some(index) = rows.iter().position(|row| !row.is_complete()) {
            return Err(FeatureError::IncompleteRow { index });
        }
        Ok(Self {
            rows: rows.to_vec(),
        })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Timestamp of the most recent row.
    pub fn last_timestamp(&self) -> i64 {
        self.rows[WINDOW_SIZE - 1].timestamp
    }

    /// Flatten row-major into the classifier's input vector:
    /// all of row 0's features, then row 1's, and so on.
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(WINDOW_SIZE * FEATURE_COUNT);
        for row in &self.rows {
            // Completeness was checked at construction.
            if let Some(features) = row.features() {
                out.extend_from_slice(&features);
            }
        }
        out
    }
}
