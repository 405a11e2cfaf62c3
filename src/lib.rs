//! # pricecast
//!
//! Short-horizon price forecasting behind a JSON stdin/stdout contract.
//!
//! A request is cleaned into a strictly positive series, handed to an
//! ordered chain of forecasting strategies (ARIMA or a changepoint trend,
//! each backed by a linear-trend fallback), clamped to plausible ranges
//! and emitted as a single JSON document.
//!
//! ```no_run
//! use pricecast::prelude::*;
//!
//! let pipeline = Pipeline::new(PipelineConfig::new(ModelFamily::Arima));
//! let outcome = pipeline.run(r#"{"series": [{"y": 10.0}], "horizonDays": 3}"#);
//! let code = outcome.emit(std::io::stdout().lock());
//! # let _ = code;
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod clamp;
pub mod config;
pub mod core;
pub mod emissions;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod response;
pub mod sanitize;
pub mod selector;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::clamp::{ClampConfig, OutputClamp};
    pub use crate::config::{ModelFamily, PipelineConfig};
    pub use crate::core::{ForecastPoint, RawForecast, SeriesInput, Timestamp, Trend};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{BoxedEngine, ForecastEngine};
    pub use crate::pipeline::{ForecastRequest, Pipeline};
    pub use crate::response::{ErrorResult, ForecastResult, Outcome};
    pub use crate::selector::{Selection, StrategyChain};
}
