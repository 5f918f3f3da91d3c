//! Error taxonomy for the analytics pipeline.

use thiserror::Error;

/// Errors raised by the analytics core.
///
/// Per-symbol market data failures are not reported through this type: they
/// are collected into [`crate::core::isolation::BatchOutcome`] so a batch can
/// still produce a partial result. This enum covers failures that terminate
/// a whole computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Malformed input: column '{column}' {reason}")]
    MalformedInput { column: String, reason: String },

    #[error("Malformed input: symbol '{0}' appears more than once in the snapshot")]
    DuplicateSymbol(String),

    #[error("Undefined result: {0}")]
    DegenerateArithmetic(String),

    #[error("Market data unavailable for {symbol}: {reason}")]
    ExternalFetchFailure { symbol: String, reason: String },

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Unknown symbol: {0} is not part of the snapshot")]
    UnknownSymbol(String),
}

impl AnalyticsError {
    pub fn missing_column(column: &str) -> Self {
        AnalyticsError::MalformedInput {
            column: column.to_string(),
            reason: "is required but missing from the holdings table".to_string(),
        }
    }
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
