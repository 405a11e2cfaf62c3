//! One forecasting invocation, from raw payload to [`Outcome`].

use crate::clamp::OutputClamp;
use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::response::{ErrorResult, ForecastResult, Outcome};
use crate::sanitize::SeriesSanitizer;
use serde::Deserialize;
use serde_json::Value;

/// Request payload read from stdin.
///
/// `series` entries stay as raw JSON so the sanitizer can discard bad rows
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub series: Option<Vec<Value>>,
    #[serde(rename = "horizonDays", default)]
    pub horizon_days: Option<Value>,
}

impl ForecastRequest {
    /// Parse a request document. Blank input is [`ForecastError::EmptyInput`].
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(ForecastError::EmptyInput);
        }
        serde_json::from_str(input).map_err(|e| ForecastError::MalformedInput(e.to_string()))
    }

    /// Requested horizon, or `default` when absent.
    ///
    /// Accepts integers and integral floats in `1..=max`.
    pub fn horizon(&self, default: usize, max: usize) -> Result<usize> {
        let raw = match &self.horizon_days {
            None | Some(Value::Null) => return Ok(default),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => i,
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
                    .ok_or_else(|| {
                        ForecastError::MalformedInput(format!("horizonDays must be an integer, got {n}"))
                    })?,
            },
            Some(other) => {
                return Err(ForecastError::MalformedInput(format!(
                    "horizonDays must be an integer, got {other}"
                )))
            }
        };

        match usize::try_from(raw) {
            Ok(h) if (1..=max).contains(&h) => Ok(h),
            _ => Err(ForecastError::InvalidHorizon { got: raw, max }),
        }
    }

    pub fn raw_series(&self) -> &[Value] {
        self.series.as_deref().unwrap_or_default()
    }
}

/// Wires sanitizer, strategy chain, clamp and response assembly.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on a raw request document.
    pub fn run(&self, input: &str) -> Outcome {
        match ForecastRequest::parse(input) {
            Ok(request) => self.run_request(&request),
            Err(error) => self.failure(&error, self.config.family.tag()),
        }
    }

    /// Run the pipeline on an already parsed request.
    pub fn run_request(&self, request: &ForecastRequest) -> Outcome {
        let family = self.config.family;

        let horizon = match request.horizon(self.config.default_horizon, self.config.max_horizon) {
            Ok(h) => h,
            Err(error) => return self.failure(&error, family.tag()),
        };

        let chain = family.build_chain(&self.config);
        let sanitizer = SeriesSanitizer::new(chain.min_points(), self.config.synthesis_plan());
        let series = match sanitizer.clean(request.raw_series()) {
            Ok(series) => series,
            Err(error) => return self.failure(&error, family.tag()),
        };

        let mut selection = match chain.select(&series, horizon) {
            Ok(selection) => selection,
            Err(failure) => return self.failure(&failure.error, failure.model),
        };

        if selection.clamped {
            if let Some(last) = series.last_value() {
                OutputClamp::new(self.config.clamp.clone()).apply(&mut selection.forecast, last);
            }
        }

        match ForecastResult::from_selection(selection, horizon, series.len(), series.is_synthetic()) {
            Ok(result) => result.into(),
            Err(error) => self.failure(&error, family.fallback_tag()),
        }
    }

    fn failure(&self, error: &ForecastError, model: impl Into<String>) -> Outcome {
        let model = model.into();
        tracing::error!(%error, model = %model, "forecast failed");
        ErrorResult::from_error(error, model).into()
    }
}
