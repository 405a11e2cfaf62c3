//! Core data structures for series and forecasts.

mod forecast;
mod series;

pub use forecast::{ForecastPoint, RawForecast, SummaryExtras, Trend};
pub use series::{Observation, SeriesInput, Timeline, Timestamp};
