//! ForecastEngine trait defining the common interface for all strategies.

use crate::core::{RawForecast, SeriesInput};
use crate::error::{ForecastError, Result};

/// A forecasting strategy the model selector can attempt.
///
/// This trait is object-safe and can be used with `Box<dyn ForecastEngine>`.
pub trait ForecastEngine {
    /// Model tag reported in the response (`"arima"`, `"prophet_fallback"`, ...).
    fn name(&self) -> &str;

    /// Minimum number of cleaned observations the engine can fit.
    fn min_points(&self) -> usize;

    /// Whether output must pass through the plausibility clamp.
    fn clamped(&self) -> bool {
        false
    }

    /// Fit the series and forecast `horizon` periods ahead.
    fn fit_and_forecast(&self, series: &SeriesInput, horizon: usize) -> Result<RawForecast>;
}

/// Type alias for boxed engine trait objects.
pub type BoxedEngine = Box<dyn ForecastEngine>;

/// Fail with [`ForecastError::InsufficientData`] below the engine minimum.
pub(crate) fn ensure_min_points(series: &SeriesInput, needed: usize) -> Result<()> {
    if series.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: series.len(),
        });
    }
    Ok(())
}
