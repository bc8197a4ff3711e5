//! Feature standardization: the fitted (mean, std) transform.

use serde::{Deserialize, Serialize};

use coral_core::error::ModelError;

/// Per-feature standardization fitted during training.
///
/// `transform` maps each feature to `(x - mean) / std`. Features with zero
/// fitted std pass through unscaled (divisor 1), matching the fitting
/// code's handling of constant columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Scaler {
    pub fn new(means: Vec<f64>, stds: Vec<f64>) -> Result<Self, ModelError> {
        if means.len() != stds.len() {
            return Err(ModelError::DimensionMismatch {
                expected: means.len(),
                actual: stds.len(),
            });
        }
        Ok(Self { means, stds })
    }

    /// Number of features the scaler was fitted on.
    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Standardize a feature vector in place-order: `(x - mean) / std`.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.len(),
                actual: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&x, (&mean, &std))| (x - mean) / effective_std(std))
            .collect())
    }

    /// Invert the transform: `x * std + mean`.
    pub fn inverse(&self, scaled: &[f64]) -> Result<Vec<f64>, ModelError> {
        if scaled.len() != self.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.len(),
                actual: scaled.len(),
            });
        }
        Ok(scaled
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&z, (&mean, &std))| z * effective_std(std) + mean)
            .collect())
    }
}

fn effective_std(std: f64) -> f64 {
    if std == 0.0 {
        1.0
    } else {
        std
    }
}
