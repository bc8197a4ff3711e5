//! The classifier facade: artifacts in, ternary signal out.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use coral_core::error::ModelError;
use coral_core::types::{Signal, Window, FEATURE_COUNT, WINDOW_SIZE};

use crate::forest::GradientBoostedForest;
use crate::scaler::Scaler;

/// A loaded model: fitted scaler plus boosted forest.
///
/// Loaded once per process; a failure here is fatal at startup since there
/// is no safe degraded mode for trading without a model.
pub struct Classifier {
    scaler: Scaler,
    forest: GradientBoostedForest,
}

impl Classifier {
    /// Load both artifacts and cross-check their dimensions against the
    /// window layout this build expects.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ModelError> {
        let forest: GradientBoostedForest = read_artifact(model_path)?;
        forest.validate()?;
        let scaler: Scaler = read_artifact(scaler_path)?;

        let expected = WINDOW_SIZE * FEATURE_COUNT;
        if scaler.len() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: scaler.len(),
            });
        }
        if forest.feature_count != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: forest.feature_count,
            });
        }

        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            classes = forest.n_classes(),
            features = forest.feature_count,
            "model artifacts loaded"
        );

        Ok(Self { scaler, forest })
    }

    pub fn new(scaler: Scaler, forest: GradientBoostedForest) -> Result<Self, ModelError> {
        if scaler.len() != forest.feature_count {
            return Err(ModelError::DimensionMismatch {
                expected: forest.feature_count,
                actual: scaler.len(),
            });
        }
        Ok(Self { scaler, forest })
    }

    /// Classify one window: flatten row-major, standardize, predict.
    ///
    /// `Window` construction already rejects rows with missing indicators,
    /// so by the time a window reaches here its vector is full width; a
    /// short vector means a logic error upstream and is refused.
    pub fn classify(&self, window: &Window) -> Result<Signal, ModelError> {
        let features = window.flatten();
        if features.len() != self.scaler.len() {
            return Err(ModelError::IncompleteWindow);
        }
        let scaled = self.scaler.transform(&features)?;
        let class = self.forest.predict(&scaled)?;
        Signal::from_class(class)
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let file = File::open(path).map_err(|e| ModelError::Artifact {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ModelError::Artifact {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
