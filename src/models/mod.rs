//! Forecasting strategies.

mod traits;

pub mod arima;
pub mod changepoint;
mod linear;

pub use arima::ArimaEngine;
pub use changepoint::{ChangepointTrendConfig, ChangepointTrendEngine};
pub use linear::LinearTrendEngine;
pub use traits::{BoxedEngine, ForecastEngine};

/// Two-sided 95% normal critical value used for fixed-width bands.
pub const Z_95: f64 = 1.96;
