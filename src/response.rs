//! Wire shapes and the single write point for results.

use crate::core::{ForecastPoint, SummaryExtras, Trend};
use crate::error::{ForecastError, Result};
use crate::selector::Selection;
use serde::Serialize;
use std::io::Write;

/// Summary statistics reported with every successful forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub historical_mean: f64,
    pub historical_std: f64,
    pub forecast_trend: Trend,
    pub confidence: f64,
    #[serde(flatten)]
    pub extras: SummaryExtras,
}

/// Success-shaped response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub model: String,
    pub horizon_days: usize,
    pub data_points: usize,
    /// Final point of the path.
    pub next: ForecastPoint,
    pub path: Vec<ForecastPoint>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ForecastResult {
    /// Assemble the response from the winning strategy's (clamped) forecast.
    pub fn from_selection(
        selection: Selection,
        horizon: usize,
        data_points: usize,
        synthetic: bool,
    ) -> Result<Self> {
        let Selection {
            model, forecast, ..
        } = selection;

        let trend = forecast.trend();
        let next = forecast
            .last_point()
            .cloned()
            .ok_or_else(|| ForecastError::fit_failure(&model, "empty forecast path"))?;

        Ok(Self {
            summary: Summary {
                historical_mean: forecast.historical_mean,
                historical_std: forecast.historical_std,
                forecast_trend: trend,
                confidence: forecast.confidence,
                extras: forecast.extras,
            },
            model,
            horizon_days: horizon,
            data_points,
            next,
            path: forecast.points,
            synthetic,
        })
    }
}

/// Error-shaped response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub error: String,
    pub model: String,
}

impl ErrorResult {
    pub fn new(error: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            model: model.into(),
        }
    }

    pub fn from_error(error: &ForecastError, model: impl Into<String>) -> Self {
        Self::new(error.to_string(), model)
    }
}

/// Result of one invocation; exactly one of these is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Box<ForecastResult>),
    Failure(ErrorResult),
}

impl Outcome {
    pub const EXIT_SUCCESS: u8 = 0;
    pub const EXIT_FAILURE: u8 = 1;

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Success(_) => Self::EXIT_SUCCESS,
            Outcome::Failure(_) => Self::EXIT_FAILURE,
        }
    }

    /// Serialize to one compact JSON value.
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Outcome::Success(result) => serde_json::to_string(result),
            Outcome::Failure(error) => serde_json::to_string(error),
        }
    }

    /// Write one JSON line to `writer` and return the process exit code.
    ///
    /// A serialization or IO failure is logged and reported as exit 1.
    pub fn emit<W: Write>(&self, mut writer: W) -> u8 {
        let written = self
            .to_json()
            .map_err(std::io::Error::from)
            .and_then(|json| {
                writeln!(writer, "{json}")?;
                writer.flush()
            });

        match written {
            Ok(()) => self.exit_code(),
            Err(error) => {
                tracing::error!(%error, "failed to write result");
                Self::EXIT_FAILURE
            }
        }
    }
}

impl From<ForecastResult> for Outcome {
    fn from(result: ForecastResult) -> Self {
        Outcome::Success(Box::new(result))
    }
}

impl From<ErrorResult> for Outcome {
    fn from(error: ErrorResult) -> Self {
        Outcome::Failure(error)
    }
}
