//! Numerical helpers shared by the engines.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{linear_fit, ridge_fit, LinearFit};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{mean, normal_critical_value, population_std, sample_std};
