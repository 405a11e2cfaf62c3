//! Forecast result structures produced by the engines.

use crate::core::Timestamp;
use crate::error::{ForecastError, Result};
use serde::Serialize;

/// One forecast period with its uncertainty band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub ds: Timestamp,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    /// Point with a band of `half_width` on either side.
    pub fn symmetric(ds: Timestamp, yhat: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        Self {
            ds,
            yhat,
            yhat_lower: yhat - half_width,
            yhat_upper: yhat + half_width,
        }
    }

    fn is_finite(&self) -> bool {
        self.yhat.is_finite() && self.yhat_lower.is_finite() && self.yhat_upper.is_finite()
    }
}

/// Direction of the forecast relative to the historical mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    /// `Increasing` only when the final forecast is strictly above the mean.
    pub fn classify(final_value: f64, historical_mean: f64) -> Self {
        if final_value > historical_mean {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }
}

/// Model-specific fields appended to the response summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arima_order: Option<String>,
}

/// Output of a single engine before clamping and response assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    /// One point per horizon step.
    pub points: Vec<ForecastPoint>,
    pub std_error: f64,
    pub historical_mean: f64,
    pub historical_std: f64,
    /// Confidence label reported in the summary.
    pub confidence: f64,
    pub extras: SummaryExtras,
}

impl RawForecast {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn last_point(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    pub fn trend(&self) -> Trend {
        let last = self.last_point().map(|p| p.yhat).unwrap_or(f64::NAN);
        Trend::classify(last, self.historical_mean)
    }

    /// Reject forecasts that would serialize as `null`.
    pub fn ensure_finite(&self, model: &str) -> Result<()> {
        if !self.points.iter().all(ForecastPoint::is_finite) {
            return Err(ForecastError::fit_failure(model, "non-finite forecast values"));
        }
        if !self.historical_mean.is_finite() || !self.historical_std.is_finite() {
            return Err(ForecastError::fit_failure(model, "non-finite series statistics"));
        }
        Ok(())
    }
}
