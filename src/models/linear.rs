//! Linear-trend fallback strategy.

use crate::core::{ForecastPoint, RawForecast, SeriesInput, SummaryExtras};
use crate::error::{ForecastError, Result};
use crate::models::traits::{ensure_min_points, ForecastEngine};
use crate::models::Z_95;
use crate::utils::{linear_fit, mean, population_std};

/// Ordinary least squares over the point index.
///
/// Last line of defense for every model family, so it only needs five points
/// and has no failure modes beyond degenerate input. The output depends only
/// on the cleaned values and timeline, which makes it bit-for-bit
/// reproducible.
#[derive(Debug, Clone)]
pub struct LinearTrendEngine {
    tag: String,
}

impl LinearTrendEngine {
    pub const MIN_POINTS: usize = 5;
    pub const CONFIDENCE: f64 = 0.80;
    pub const METHOD: &'static str = "linear_regression_fallback";

    /// `tag` is the model name reported when this engine wins,
    /// e.g. `"prophet_fallback"`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl ForecastEngine for LinearTrendEngine {
    fn name(&self) -> &str {
        &self.tag
    }

    fn min_points(&self) -> usize {
        Self::MIN_POINTS
    }

    fn fit_and_forecast(&self, series: &SeriesInput, horizon: usize) -> Result<RawForecast> {
        ensure_min_points(series, Self::MIN_POINTS)?;

        let values = series.values();
        let fit = linear_fit(values)
            .ok_or_else(|| ForecastError::fit_failure(&self.tag, "linear fit needs two points"))?;
        let std_error = population_std(&fit.residuals(values));
        tracing::debug!(slope = fit.slope, intercept = fit.intercept, std_error, "fitted linear trend");

        let n = values.len();
        let points = series
            .future_timestamps(horizon)
            .into_iter()
            .enumerate()
            .map(|(k, ds)| ForecastPoint::symmetric(ds, fit.at((n + k) as f64), Z_95 * std_error))
            .collect();

        let forecast = RawForecast {
            points,
            std_error,
            historical_mean: mean(values),
            historical_std: population_std(values),
            confidence: Self::CONFIDENCE,
            extras: SummaryExtras {
                method: Some(Self::METHOD.to_string()),
                ..Default::default()
            },
        };
        forecast.ensure_finite(&self.tag)?;
        Ok(forecast)
    }
}
