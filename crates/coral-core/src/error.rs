//! Error types for the trading bot.

use thiserror::Error;

/// Top-level error aggregating every subsystem.
#[derive(Error, Debug)]
pub enum CoralError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors from the exchange adapter.
///
/// `Network` and `Rejected` are the transient/per-order failures the engine
/// catches per symbol; they never abort a cycle.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Exchange API error: {0}")]
    Api(String),
}

/// Errors from the position store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    #[error("Store error: {0}")]
    Internal(String),
}

/// Errors from the feature pipeline and windowing.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Insufficient history: need {required} rows, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Incomplete feature row at index {index}")]
    IncompleteRow { index: usize },

    #[error("Invalid window size: expected {expected}, got {actual}")]
    WindowSize { expected: usize, actual: usize },
}

/// Errors from model artifact loading and classification.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to load artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("Feature dimension mismatch: model expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Window contains missing indicator values")]
    IncompleteWindow,

    #[error("Unknown class index: {0}")]
    UnknownClass(usize),
}

/// Result type alias for trading operations.
pub type CoralResult<T> = Result<T, CoralError>;
