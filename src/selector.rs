//! Ordered strategy chain: first success wins.

use crate::core::{RawForecast, SeriesInput};
use crate::error::ForecastError;
use crate::models::{BoxedEngine, ForecastEngine};
use thiserror::Error;

/// The forecast produced by the winning strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Tag of the engine that produced the forecast.
    pub model: String,
    pub forecast: RawForecast,
    /// Whether the forecast still has to go through the output clamp.
    pub clamped: bool,
}

/// Terminal failure of the last strategy in the chain.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ModelFailure {
    /// Tag of the strategy that failed last.
    pub model: String,
    pub error: ForecastError,
}

/// Engines tried in order, each at most once per invocation.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<BoxedEngine>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy (builder style).
    pub fn with(mut self, engine: impl ForecastEngine + 'static) -> Self {
        self.push(Box::new(engine));
        self
    }

    pub fn push(&mut self, engine: BoxedEngine) {
        self.strategies.push(engine);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxedEngine> {
        self.strategies.iter()
    }

    /// Smallest series any strategy can fit, or 0 for an empty chain.
    pub fn min_points(&self) -> usize {
        self.strategies.iter().map(|s| s.min_points()).min().unwrap_or(0)
    }

    /// Run the chain on `series`.
    ///
    /// A recoverable error moves on to the next strategy; the last
    /// strategy's error, or any non-recoverable one, is returned tagged with
    /// the strategy that raised it.
    pub fn select(&self, series: &SeriesInput, horizon: usize) -> Result<Selection, ModelFailure> {
        if horizon == 0 {
            return Err(ModelFailure {
                model: self.last_name(),
                error: ForecastError::InvalidHorizon { got: 0, max: usize::MAX },
            });
        }

        let mut strategies = self.strategies.iter().peekable();
        while let Some(engine) = strategies.next() {
            match engine.fit_and_forecast(series, horizon) {
                Ok(forecast) => {
                    tracing::info!(
                        model = engine.name(),
                        data_points = series.len(),
                        horizon,
                        "forecast produced"
                    );
                    return Ok(Selection {
                        model: engine.name().to_string(),
                        forecast,
                        clamped: engine.clamped(),
                    });
                }
                Err(error) => match strategies.peek() {
                    Some(next) if error.is_recoverable() => {
                        tracing::warn!(
                            model = engine.name(),
                            next = next.name(),
                            %error,
                            "strategy failed, degrading"
                        );
                    }
                    _ => {
                        return Err(ModelFailure {
                            model: engine.name().to_string(),
                            error,
                        })
                    }
                },
            }
        }

        Err(ModelFailure {
            model: self.last_name(),
            error: ForecastError::CapabilityUnavailable("forecast".to_string()),
        })
    }

    fn last_name(&self) -> String {
        self.strategies
            .last()
            .map(|s| s.name().to_string())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ForecastPoint, SummaryExtras, Timestamp};
    use crate::error::Result;
    use crate::models::LinearTrendEngine;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Stub {
        name: &'static str,
        error: Option<ForecastError>,
        calls: Rc<Cell<usize>>,
    }

    impl Stub {
        fn failing(name: &'static str, error: ForecastError) -> Self {
            Self {
                name,
                error: Some(error),
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl ForecastEngine for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn min_points(&self) -> usize {
            10
        }

        fn clamped(&self) -> bool {
            true
        }

        fn fit_and_forecast(&self, _series: &SeriesInput, horizon: usize) -> Result<RawForecast> {
            self.calls.set(self.calls.get() + 1);
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            Ok(RawForecast {
                points: (0..horizon)
                    .map(|i| ForecastPoint::symmetric(Timestamp::Index(i as i64), 1.0, 0.1))
                    .collect(),
                std_error: 0.1,
                historical_mean: 1.0,
                historical_std: 0.0,
                confidence: 0.9,
                extras: SummaryExtras::default(),
            })
        }
    }

    fn series() -> SeriesInput {
        SeriesInput::from_values((1..=30).map(f64::from).collect())
    }

    #[test]
    fn primary_success_wins() {
        let chain = StrategyChain::new()
            .with(Stub {
                name: "prophet",
                error: None,
                calls: Rc::new(Cell::new(0)),
            })
            .with(LinearTrendEngine::new("prophet_fallback"));

        let selection = chain.select(&series(), 7).unwrap();
        assert_eq!(selection.model, "prophet");
        assert!(selection.clamped);
        assert_eq!(selection.forecast.horizon(), 7);
    }

    #[test]
    fn unavailable_primary_degrades_to_fallback() {
        let primary = Stub::failing(
            "prophet",
            ForecastError::CapabilityUnavailable("prophet".into()),
        );
        let calls = Rc::clone(&primary.calls);
        let chain = StrategyChain::new()
            .with(primary)
            .with(LinearTrendEngine::new("prophet_fallback"));

        let selection = chain.select(&series(), 7).unwrap();
        assert_eq!(selection.model, "prophet_fallback");
        assert!(!selection.clamped);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failing_fallback_is_reported_under_its_own_tag() {
        let chain = StrategyChain::new()
            .with(Stub::failing("arima", ForecastError::fit_failure("arima", "diverged")))
            .with(LinearTrendEngine::new("arima_fallback"));

        let short = SeriesInput::from_values(vec![1.0, 2.0, 3.0]);
        let failure = chain.select(&short, 3).unwrap_err();
        assert_eq!(failure.model, "arima_fallback");
        assert_eq!(failure.error, ForecastError::InsufficientData { needed: 5, got: 3 });
        assert_eq!(failure.to_string(), "Insufficient data: need >= 5 rows, got 3");
    }

    #[test]
    fn chain_minimum_is_the_smallest_engine_minimum() {
        let chain = StrategyChain::new()
            .with(Stub::failing("arima", ForecastError::EmptyInput))
            .with(LinearTrendEngine::new("arima_fallback"));
        assert_eq!(chain.min_points(), 5);
        assert_eq!(chain.len(), 2);
        assert_eq!(format!("{chain:?}"), r#"["arima", "arima_fallback"]"#);
    }

    #[test]
    fn non_recoverable_error_stops_the_chain() {
        let chain = StrategyChain::new()
            .with(Stub::failing("arima", ForecastError::EmptyInput))
            .with(LinearTrendEngine::new("arima_fallback"));
        let failure = chain.select(&series(), 3).unwrap_err();
        assert_eq!(failure.model, "arima");
        assert_eq!(failure.error, ForecastError::EmptyInput);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let chain = StrategyChain::new().with(LinearTrendEngine::new("prophet_fallback"));
        let failure = chain.select(&series(), 0).unwrap_err();
        assert!(matches!(failure.error, ForecastError::InvalidHorizon { got: 0, .. }));
    }
}
