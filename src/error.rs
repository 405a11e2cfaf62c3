//! Error types for the pricecast pipeline.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while parsing, cleaning or forecasting a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Standard input was empty or whitespace only.
    #[error("No input data provided")]
    EmptyInput,

    /// The request payload could not be parsed.
    #[error("Invalid JSON input: {0}")]
    MalformedInput(String),

    /// The requested horizon is outside `1..=max`.
    #[error("Invalid horizon: horizonDays must be between 1 and {max}, got {got}")]
    InvalidHorizon { got: i64, max: usize },

    /// Fewer valid observations than the active model requires.
    #[error("Insufficient data: need >= {needed} rows, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The estimator backing a model is not compiled in or was disabled.
    #[error("{0} estimator unavailable")]
    CapabilityUnavailable(String),

    /// The estimator raised during fitting or forecasting.
    #[error("{model} forecasting failed: {reason}")]
    FitFailure { model: String, reason: String },
}

impl ForecastError {
    /// Build a [`ForecastError::FitFailure`] for the given model tag.
    pub fn fit_failure(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FitFailure {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Whether the model selector may recover from this error by moving on
    /// to the next strategy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CapabilityUnavailable(_) | Self::InsufficientData { .. } | Self::FitFailure { .. }
        )
    }
}
