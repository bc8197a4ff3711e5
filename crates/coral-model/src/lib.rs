//! Signal classifier: model artifacts and inference.
//!
//! A trained run produces two JSON artifacts: a standard scaler
//! (per-feature mean/std) and a gradient-boosted forest (one tree ensemble
//! per class). [`Classifier`] loads both once at startup and maps a feature
//! window onto the ternary trade signal. Artifact problems are fatal at
//! load time; nothing here retries per cycle.

mod classifier;
mod forest;
mod scaler;

pub use classifier::Classifier;
pub use forest::{GradientBoostedForest, TreeNode};
pub use scaler::Scaler;
