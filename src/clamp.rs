//! Plausibility constraints on forecast values.

use crate::core::RawForecast;

/// Bounds applied to clamped forecasts, relative to the last observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampConfig {
    /// Multiple of the last value substituted for negative forecasts.
    pub negative_replacement: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
    /// Upper bound on the relative band half-width.
    pub max_volatility: f64,
}

impl Default for ClampConfig {
    fn default() -> Self {
        Self {
            negative_replacement: 0.95,
            min_ratio: 0.5,
            max_ratio: 1.5,
            max_volatility: 0.2,
        }
    }
}

impl ClampConfig {
    pub fn with_negative_replacement(mut self, factor: f64) -> Self {
        self.negative_replacement = factor;
        self
    }

    pub fn with_ratio_bounds(mut self, min_ratio: f64, max_ratio: f64) -> Self {
        self.min_ratio = min_ratio.min(max_ratio);
        self.max_ratio = max_ratio.max(min_ratio);
        self
    }

    pub fn with_max_volatility(mut self, max_volatility: f64) -> Self {
        self.max_volatility = max_volatility.max(0.0);
        self
    }
}

/// Applies [`ClampConfig`] point by point.
#[derive(Debug, Clone, Default)]
pub struct OutputClamp {
    config: ClampConfig,
}

impl OutputClamp {
    pub fn new(config: ClampConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClampConfig {
        &self.config
    }

    /// Relative band half-width derived from the history.
    pub fn volatility(&self, historical_std: f64, historical_mean: f64) -> f64 {
        let ratio = historical_std / historical_mean;
        if ratio.is_finite() {
            ratio.min(self.config.max_volatility).max(0.0)
        } else {
            0.0
        }
    }

    /// Clamp every point of `forecast` against `last`, the last observed value.
    pub fn apply(&self, forecast: &mut RawForecast, last: f64) {
        let cfg = &self.config;
        let volatility = self.volatility(forecast.historical_std, forecast.historical_mean);
        let (lo, hi) = (cfg.min_ratio * last, cfg.max_ratio * last);

        let mut adjusted = 0usize;
        for point in &mut forecast.points {
            let mut yhat = point.yhat;
            if yhat < 0.0 {
                yhat = cfg.negative_replacement * last;
            }
            yhat = yhat.clamp(lo, hi);
            if yhat != point.yhat {
                adjusted += 1;
            }

            point.yhat = yhat;
            point.yhat_lower = yhat * (1.0 - volatility);
            point.yhat_upper = yhat * (1.0 + volatility);
        }

        if adjusted > 0 {
            tracing::debug!(adjusted, last, volatility, "clamped forecast values");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ForecastPoint, SummaryExtras, Timestamp};
    use approx::assert_relative_eq;

    fn forecast(yhats: &[f64], mean: f64, std: f64) -> RawForecast {
        RawForecast {
            points: yhats
                .iter()
                .enumerate()
                .map(|(i, &y)| ForecastPoint::symmetric(Timestamp::Index(i as i64), y, 5.0))
                .collect(),
            std_error: 1.0,
            historical_mean: mean,
            historical_std: std,
            confidence: 0.85,
            extras: SummaryExtras::default(),
        }
    }

    #[test]
    fn negative_values_are_replaced_then_bounded() {
        let mut f = forecast(&[-10.0, 10.0, 500.0, 120.0], 100.0, 10.0);
        OutputClamp::default().apply(&mut f, 100.0);

        let yhats: Vec<f64> = f.points.iter().map(|p| p.yhat).collect();
        assert_relative_eq!(yhats[0], 95.0);
        assert_relative_eq!(yhats[1], 50.0);
        assert_relative_eq!(yhats[2], 150.0);
        assert_relative_eq!(yhats[3], 120.0);
    }

    #[test]
    fn band_follows_volatility_ratio() {
        let mut f = forecast(&[100.0], 100.0, 10.0);
        OutputClamp::default().apply(&mut f, 100.0);
        assert_relative_eq!(f.points[0].yhat_lower, 90.0, epsilon = 1e-9);
        assert_relative_eq!(f.points[0].yhat_upper, 110.0, epsilon = 1e-9);
    }

    #[test]
    fn volatility_is_capped() {
        let clamp = OutputClamp::default();
        assert_relative_eq!(clamp.volatility(80.0, 100.0), 0.2);
        assert_relative_eq!(clamp.volatility(5.0, 100.0), 0.05);
        assert_eq!(clamp.volatility(f64::NAN, 100.0), 0.0);
        assert_eq!(clamp.volatility(1.0, 0.0), 0.0);
    }

    #[test]
    fn custom_bounds_are_respected() {
        let clamp = OutputClamp::new(ClampConfig::default().with_ratio_bounds(0.9, 1.1));
        let mut f = forecast(&[50.0, 200.0], 100.0, 0.0);
        clamp.apply(&mut f, 100.0);
        assert_relative_eq!(f.points[0].yhat, 90.0);
        assert_relative_eq!(f.points[1].yhat, 110.0);
        assert_eq!(f.points[1].yhat_lower, f.points[1].yhat_upper);
    }
}
