//! Primary autoregressive strategy.

use crate::core::{ForecastPoint, RawForecast, SeriesInput, SummaryExtras};
use crate::error::{ForecastError, Result};
use crate::models::arima::model::{Arima, ArimaOrder};
use crate::models::traits::{ensure_min_points, ForecastEngine};
use crate::models::Z_95;
use crate::utils::{mean, population_std};

/// ARIMA(1,1,1) strategy with a fixed-width band.
///
/// The band is `±1.96 × 0.1 × σ` where σ is the population standard deviation
/// of the history. It does not widen with the horizon.
#[derive(Debug, Clone)]
pub struct ArimaEngine {
    estimator: Arima,
    min_points: usize,
}

impl ArimaEngine {
    pub const NAME: &'static str = "arima";
    pub const MIN_POINTS: usize = 10;
    /// Share of the historical standard deviation used as the standard error.
    pub const STD_ERROR_RATIO: f64 = 0.1;
    pub const CONFIDENCE: f64 = 0.95;

    pub fn new() -> Self {
        Self {
            estimator: Arima::new(ArimaOrder::default()),
            min_points: Self::MIN_POINTS,
        }
    }

    pub fn order(&self) -> ArimaOrder {
        self.estimator.order()
    }
}

impl Default for ArimaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastEngine for ArimaEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        self.min_points
    }

    fn fit_and_forecast(&self, series: &SeriesInput, horizon: usize) -> Result<RawForecast> {
        ensure_min_points(series, self.min_points)?;

        let values = series.values();
        let fitted = self.estimator.fit(values)?;
        let path = fitted.forecast(horizon);
        if path.len() != horizon {
            return Err(ForecastError::fit_failure(
                Self::NAME,
                format!("expected {horizon} forecast steps, got {}", path.len()),
            ));
        }

        let historical_mean = mean(values);
        let historical_std = population_std(values);
        let std_error = Self::STD_ERROR_RATIO * historical_std;

        let points = series
            .future_timestamps(horizon)
            .into_iter()
            .zip(path)
            .map(|(ds, yhat)| ForecastPoint::symmetric(ds, yhat, Z_95 * std_error))
            .collect();

        let forecast = RawForecast {
            points,
            std_error,
            historical_mean,
            historical_std,
            confidence: Self::CONFIDENCE,
            extras: SummaryExtras {
                arima_order: Some(fitted.order().to_string()),
                ..Default::default()
            },
        };
        forecast.ensure_finite(Self::NAME)?;
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Timestamp;
    use approx::assert_relative_eq;

    fn series(n: usize) -> SeriesInput {
        SeriesInput::from_values(
            (0..n)
                .map(|i| 100.0 + i as f64 + (i as f64 * 0.7).sin())
                .collect(),
        )
    }

    #[test]
    fn produces_constant_width_band() {
        let s = series(40);
        let forecast = ArimaEngine::new().fit_and_forecast(&s, 7).unwrap();

        assert_eq!(forecast.horizon(), 7);
        assert_relative_eq!(
            forecast.std_error,
            0.1 * population_std(s.values()),
            epsilon = 1e-12
        );
        for p in &forecast.points {
            assert_relative_eq!(p.yhat_upper - p.yhat, 1.96 * forecast.std_error, epsilon = 1e-9);
            assert_relative_eq!(p.yhat - p.yhat_lower, 1.96 * forecast.std_error, epsilon = 1e-9);
        }
        assert_eq!(forecast.confidence, 0.95);
        assert_eq!(forecast.extras.arima_order.as_deref(), Some("(1,1,1)"));
    }

    #[test]
    fn implicit_series_is_indexed_after_last_point() {
        let forecast = ArimaEngine::new().fit_and_forecast(&series(12), 3).unwrap();
        let ds: Vec<_> = forecast.points.iter().map(|p| p.ds).collect();
        assert_eq!(
            ds,
            vec![Timestamp::Index(12), Timestamp::Index(13), Timestamp::Index(14)]
        );
    }

    #[test]
    fn requires_ten_points() {
        let err = ArimaEngine::new()
            .fit_and_forecast(&series(9), 3)
            .unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 10, got: 9 });
    }

    #[test]
    fn is_not_clamped() {
        assert!(!ArimaEngine::new().clamped());
        assert_eq!(ArimaEngine::new().name(), "arima");
    }
}
