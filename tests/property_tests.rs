//! Property-based tests for the forecasting pipeline.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated price series.

use pricecast::clamp::OutputClamp;
use pricecast::config::{ModelFamily, PipelineConfig};
use pricecast::core::SeriesInput;
use pricecast::models::{ArimaEngine, ForecastEngine, LinearTrendEngine};
use pricecast::pipeline::Pipeline;
use pricecast::response::Outcome;
use proptest::prelude::*;
use serde_json::json;

/// Strictly positive series with a little drift so variance is never zero.
fn price_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(1.0..1000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.001;
            }
            v
        })
    })
}

fn request(values: &[f64], horizon: usize) -> String {
    let series: Vec<_> = values.iter().map(|y| json!({ "y": y })).collect();
    json!({ "series": series, "horizonDays": horizon }).to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn path_has_horizon_points_with_ordered_bands(
        values in price_strategy(10, 60),
        horizon in 1usize..30,
        arima in any::<bool>(),
    ) {
        let family = if arima { ModelFamily::Arima } else { ModelFamily::Prophet };
        let outcome = Pipeline::new(PipelineConfig::new(family)).run(&request(&values, horizon));

        let result = match outcome {
            Outcome::Success(result) => result,
            Outcome::Failure(err) => return Err(TestCaseError::fail(format!("{err:?}"))),
        };
        prop_assert_eq!(result.path.len(), horizon);
        prop_assert_eq!(result.horizon_days, horizon);
        prop_assert_eq!(Some(&result.next), result.path.last());
        for p in &result.path {
            prop_assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
            prop_assert!(p.yhat.is_finite());
        }
    }

    #[test]
    fn fallback_is_bit_identical(values in price_strategy(5, 80), horizon in 1usize..20) {
        let series = SeriesInput::from_values(values);
        let engine = LinearTrendEngine::new("prophet_fallback");
        let a = engine.fit_and_forecast(&series, horizon).unwrap();
        let b = engine.fit_and_forecast(&series, horizon).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn arima_is_deterministic(values in price_strategy(10, 50)) {
        let series = SeriesInput::from_values(values);
        let engine = ArimaEngine::new();
        let a = engine.fit_and_forecast(&series, 5);
        let b = engine.fit_and_forecast(&series, 5);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn clamp_keeps_values_near_last_observation(
        values in price_strategy(5, 40),
        horizon in 1usize..20,
        last in 1.0..500.0_f64,
    ) {
        let series = SeriesInput::from_values(values);
        let mut forecast = LinearTrendEngine::new("prophet_fallback")
            .fit_and_forecast(&series, horizon)
            .unwrap();
        OutputClamp::default().apply(&mut forecast, last);

        for p in &forecast.points {
            prop_assert!(p.yhat >= 0.0);
            prop_assert!(p.yhat >= 0.5 * last && p.yhat <= 1.5 * last);
            prop_assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
            prop_assert!(p.yhat_upper <= p.yhat * 1.2 + 1e-9);
        }
    }

    #[test]
    fn seeded_synthesis_is_reproducible(seed in any::<u64>()) {
        let config = PipelineConfig::new(ModelFamily::Arima).with_seed(seed);
        let a = Pipeline::new(config.clone()).run("{}");
        let b = Pipeline::new(config).run("{}");
        prop_assert!(a.is_success());
        prop_assert_eq!(a, b);
    }
}
