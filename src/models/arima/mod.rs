//! ARIMA (Autoregressive Integrated Moving Average) estimator and the
//! primary autoregressive strategy built on it.

mod diff;
mod engine;
mod model;

pub use diff::{difference, integrate};
pub use engine::ArimaEngine;
pub use model::{Arima, ArimaOrder, FittedArima};
