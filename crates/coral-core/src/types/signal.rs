//! The ternary trade signal.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Classifier output for the most recent window of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    /// Numeric form used in training labels: buy +1, hold 0, sell -1.
    pub fn value(&self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    /// Map the classifier's class index {0, 1, 2} onto {-1, 0, +1}.
    pub fn from_class(class: usize) -> Result<Self, ModelError> {
        match class {
            0 => Ok(Signal::Sell),
            1 => Ok(Signal::Hold),
            2 => Ok(Signal::Buy),
            other => Err(ModelError::UnknownClass(other)),
        }
    }

    /// Inverse of [`Signal::from_class`].
    pub fn class(&self) -> usize {
        match self {
            Signal::Sell => 0,
            Signal::Hold => 1,
            Signal::Buy => 2,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::Sell)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::Buy => write!(f, "BUY"),
        }
    }
}
