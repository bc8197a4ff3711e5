//! Gradient-boosted forest inference.
//!
//! Inference only: trees are trained offline and shipped as a JSON
//! artifact. One ensemble of regression trees per class; the predicted
//! class is the argmax of the summed tree outputs.

use serde::{Deserialize, Serialize};

use coral_core::error::ModelError;

/// One node of a regression tree. Leaves have no children and carry the
/// output in `value`; split nodes route on `x[feature_idx] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub feature_idx: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
    pub value: f64,
    #[serde(default)]
    pub left: Option<Box<TreeNode>>,
    #[serde(default)]
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Walk the tree for one feature vector.
    fn predict(&self, features: &[f64]) -> f64 {
        match (self.feature_idx, self.threshold, &self.left, &self.right) {
            (Some(idx), Some(threshold), Some(left), Some(right)) => {
                let x = features.get(idx).copied().unwrap_or(0.0);
                if x <= threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
            _ => self.value,
        }
    }

    fn max_feature_idx(&self) -> usize {
        let own = self.feature_idx.map(|i| i + 1).unwrap_or(0);
        let left = self.left.as_ref().map(|n| n.max_feature_idx()).unwrap_or(0);
        let right = self
            .right
            .as_ref()
            .map(|n| n.max_feature_idx())
            .unwrap_or(0);
        own.max(left).max(right)
    }
}

/// A multiclass gradient-boosted ensemble: `class_trees[c]` are the boosted
/// regression trees scoring class `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedForest {
    /// Input width the model was trained on
    pub feature_count: usize,
    /// Score every class starts from
    pub base_score: f64,
    /// Shrinkage applied to each tree's output
    pub learning_rate: f64,
    /// Tree ensembles, one per class
    pub class_trees: Vec<Vec<TreeNode>>,
}

impl GradientBoostedForest {
    pub fn n_classes(&self) -> usize {
        self.class_trees.len()
    }

    /// Validate internal consistency after deserialization.
    pub fn validate(&self) -> Result<(), ModelError> {
        let referenced = self
            .class_trees
            .iter()
            .flatten()
            .map(TreeNode::max_feature_idx)
            .max()
            .unwrap_or(0);
        if referenced > self.feature_count {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_count,
                actual: referenced,
            });
        }
        Ok(())
    }

    /// Per-class scores for one feature vector.
    pub fn scores(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.feature_count {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_count,
                actual: features.len(),
            });
        }
        Ok(self
            .class_trees
            .iter()
            .map(|trees| {
                self.base_score
                    + self.learning_rate
                        * trees.iter().map(|t| t.predict(features)).sum::<f64>()
            })
            .collect())
    }

    /// Predicted class index: argmax of the class scores. The first class
    /// wins exact ties, which keeps prediction deterministic.
    pub fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        let scores = self.scores(features)?;
        let mut best = 0usize;
        for (i, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }
}
