//! Primary calendar-aware trend strategy ("prophet" on the wire).
//!
//! A piecewise-linear trend with no seasonal components and a deliberately
//! stiff changepoint prior, suited to noisy price series. The estimator is
//! compiled behind the `changepoint-trend` feature; without it the engine
//! reports [`ForecastError::CapabilityUnavailable`] so the selector degrades
//! to the linear fallback.

#[cfg(feature = "changepoint-trend")]
mod estimator;

#[cfg(feature = "changepoint-trend")]
pub use estimator::{ChangepointTrend, FittedTrend};

use crate::core::{ForecastPoint, RawForecast, SeriesInput, SummaryExtras, Timeline, Timestamp};
use crate::error::{ForecastError, Result};
use crate::models::traits::{ensure_min_points, ForecastEngine};
use crate::utils::{mean, sample_std};
use chrono::NaiveDate;

/// Changepoint-trend estimator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangepointTrendConfig {
    /// Maximum number of candidate changepoints.
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Scale of the prior on slope changes; smaller is stiffer.
    pub changepoint_prior_scale: f64,
    /// Width of the native uncertainty interval.
    pub interval_width: f64,
}

impl Default for ChangepointTrendConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.001,
            interval_width: 0.80,
        }
    }
}

impl ChangepointTrendConfig {
    pub fn with_n_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range.clamp(0.0, 1.0);
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }
}

/// Calendar-aware trend strategy; output always goes through the clamp.
#[derive(Debug, Clone)]
pub struct ChangepointTrendEngine {
    config: ChangepointTrendConfig,
}

impl ChangepointTrendEngine {
    pub const NAME: &'static str = "prophet";
    pub const MIN_POINTS: usize = 5;
    pub const CONFIDENCE: f64 = 0.85;

    pub fn new(config: ChangepointTrendConfig) -> Self {
        Self { config }
    }

    /// Whether the estimator is compiled in.
    pub fn is_available() -> bool {
        cfg!(feature = "changepoint-trend")
    }

    pub fn config(&self) -> &ChangepointTrendConfig {
        &self.config
    }

    #[cfg(feature = "changepoint-trend")]
    fn estimate(
        &self,
        dates: &[NaiveDate],
        values: &[f64],
        future: &[NaiveDate],
    ) -> Result<(Vec<(f64, f64, f64)>, f64)> {
        let fitted = ChangepointTrend::new(self.config.clone()).fit(dates, values)?;
        let bands = future.iter().map(|d| fitted.predict(*d)).collect();
        Ok((bands, fitted.sigma()))
    }

    #[cfg(not(feature = "changepoint-trend"))]
    fn estimate(
        &self,
        _dates: &[NaiveDate],
        _values: &[f64],
        _future: &[NaiveDate],
    ) -> Result<(Vec<(f64, f64, f64)>, f64)> {
        Err(ForecastError::CapabilityUnavailable(Self::NAME.to_string()))
    }
}

impl Default for ChangepointTrendEngine {
    fn default() -> Self {
        Self::new(ChangepointTrendConfig::default())
    }
}

fn calendar_dates(stamps: &[Timestamp]) -> Option<Vec<NaiveDate>> {
    stamps
        .iter()
        .map(|ts| match ts {
            Timestamp::Date(d) => Some(*d),
            Timestamp::Index(_) => None,
        })
        .collect()
}

impl ForecastEngine for ChangepointTrendEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        Self::MIN_POINTS
    }

    fn clamped(&self) -> bool {
        true
    }

    fn fit_and_forecast(&self, series: &SeriesInput, horizon: usize) -> Result<RawForecast> {
        if !Self::is_available() {
            return Err(ForecastError::CapabilityUnavailable(Self::NAME.to_string()));
        }
        ensure_min_points(series, Self::MIN_POINTS)?;

        let no_dates = || ForecastError::fit_failure(Self::NAME, "calendar dates (ds) are required");
        if series.timeline() != Timeline::Dated {
            return Err(no_dates());
        }
        let dates = calendar_dates(series.timestamps()).ok_or_else(no_dates)?;
        let future_stamps = series.future_timestamps(horizon);
        let future = calendar_dates(&future_stamps).ok_or_else(no_dates)?;

        let values = series.values();
        let (bands, sigma) = self.estimate(&dates, values, &future)?;

        let points = future_stamps
            .into_iter()
            .zip(bands)
            .map(|(ds, (yhat, yhat_lower, yhat_upper))| ForecastPoint {
                ds,
                yhat,
                yhat_lower,
                yhat_upper,
            })
            .collect();

        let forecast = RawForecast {
            points,
            std_error: sigma,
            historical_mean: mean(values),
            historical_std: sample_std(values),
            confidence: Self::CONFIDENCE,
            extras: SummaryExtras::default(),
        };
        forecast.ensure_finite(Self::NAME)?;
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;
    use chrono::Days;

    fn dated_series(values: &[f64]) -> SeriesInput {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let obs = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(Some(Timestamp::Date(start + Days::new(i as u64))), v))
            .collect();
        SeriesInput::from_observations(obs, false)
    }

    #[test]
    fn engine_is_clamped() {
        assert!(ChangepointTrendEngine::default().clamped());
        assert_eq!(ChangepointTrendEngine::default().min_points(), 5);
    }

    #[cfg(feature = "changepoint-trend")]
    #[test]
    fn undated_series_is_a_fit_failure() {
        let series = SeriesInput::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let err = ChangepointTrendEngine::default()
            .fit_and_forecast(&series, 2)
            .unwrap_err();
        assert!(matches!(err, ForecastError::FitFailure { .. }));
    }

    #[cfg(feature = "changepoint-trend")]
    #[test]
    fn emits_calendar_dates_after_history() {
        let values: Vec<f64> = (0..30).map(|i| 200.0 + i as f64).collect();
        let forecast = ChangepointTrendEngine::default()
            .fit_and_forecast(&dated_series(&values), 3)
            .unwrap();

        let ds: Vec<_> = forecast.points.iter().map(|p| p.ds).collect();
        assert_eq!(
            ds[0],
            Timestamp::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
        assert_eq!(ds.len(), 3);
        assert!((forecast.points[0].yhat - 230.0).abs() < 0.5);
        assert_eq!(forecast.confidence, 0.85);
    }

    #[cfg(not(feature = "changepoint-trend"))]
    #[test]
    fn missing_feature_reports_unavailable() {
        assert!(!ChangepointTrendEngine::is_available());
        let err = ChangepointTrendEngine::default()
            .fit_and_forecast(&dated_series(&[1.0; 10]), 3)
            .unwrap_err();
        assert_eq!(err, ForecastError::CapabilityUnavailable("prophet".into()));
    }
}
