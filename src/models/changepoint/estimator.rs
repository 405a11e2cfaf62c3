//! Piecewise-linear trend with changepoints, fit by penalized least squares.
//!
//! The trend is `k·t + m + Σ δ_j (t − s_j)₊` on a time axis scaled to
//! `[0, 1]` over the history, with values scaled by their maximum. Candidate
//! changepoints `s_j` are spread evenly over the first `changepoint_range`
//! share of the observations. The Laplace prior on slope changes is
//! approximated by a Gaussian prior of the same scale, which turns the MAP
//! estimate into a ridge regression with penalty `σ̂² / τ²` on each `δ_j`.

use super::ChangepointTrendConfig;
use crate::error::{ForecastError, Result};
use crate::utils::{normal_critical_value, ridge_fit};
use chrono::NaiveDate;

const MODEL: &str = "prophet";
/// Prior scale on the base growth rate and offset.
const BASE_PRIOR_SCALE: f64 = 5.0;

/// Trend estimator configured once and fit per series.
#[derive(Debug, Clone)]
pub struct ChangepointTrend {
    config: ChangepointTrendConfig,
}

/// Fitted trend that can be evaluated at any calendar date.
#[derive(Debug, Clone)]
pub struct FittedTrend {
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    k: f64,
    m: f64,
    deltas: Vec<f64>,
    /// Residual standard deviation on the original scale.
    sigma: f64,
    z: f64,
}

fn hinge_row(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|&s| (t - s).max(0.0)));
    row
}

impl ChangepointTrend {
    pub fn new(config: ChangepointTrendConfig) -> Self {
        Self { config }
    }

    fn changepoint_positions(&self, t: &[f64]) -> Vec<f64> {
        let n = t.len();
        let hist_size = ((n as f64) * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        let last = (hist_size - 1) as f64;
        let mut positions: Vec<f64> = (1..=count)
            .map(|j| t[(j as f64 * last / count as f64).round() as usize])
            .collect();
        positions.dedup();
        positions
    }

    /// Fit the trend to strictly increasing `dates` and their `values`.
    pub fn fit(&self, dates: &[NaiveDate], values: &[f64]) -> Result<FittedTrend> {
        if dates.len() != values.len() {
            return Err(ForecastError::fit_failure(
                MODEL,
                format!("{} dates for {} values", dates.len(), values.len()),
            ));
        }
        let (start, end) = match (dates.first(), dates.last()) {
            (Some(s), Some(e)) => (*s, *e),
            _ => return Err(ForecastError::InsufficientData { needed: 2, got: 0 }),
        };
        let span_days = (end - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(ForecastError::fit_failure(MODEL, "history spans less than one day"));
        }

        let y_scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if y_scale <= 0.0 || !y_scale.is_finite() {
            return Err(ForecastError::fit_failure(MODEL, "series has no usable scale"));
        }

        let t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();
        let y: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        // Noise level of a plain line sets the strength of every prior.
        let line_design: Vec<Vec<f64>> = t.iter().map(|&ti| hinge_row(ti, &[])).collect();
        let line = ridge_fit(&line_design, &y, &[0.0, 0.0])
            .ok_or_else(|| ForecastError::fit_failure(MODEL, "degenerate time axis"))?;
        let noise_var = (t
            .iter()
            .zip(&y)
            .map(|(ti, yi)| (yi - line[0] - line[1] * ti).powi(2))
            .sum::<f64>()
            / t.len() as f64)
            .max(1e-12);

        let changepoints = self.changepoint_positions(&t);
        let design: Vec<Vec<f64>> = t.iter().map(|&ti| hinge_row(ti, &changepoints)).collect();
        let tau = self.config.changepoint_prior_scale;
        let mut penalties = vec![noise_var / BASE_PRIOR_SCALE.powi(2); 2];
        penalties.extend(std::iter::repeat(noise_var / (tau * tau)).take(changepoints.len()));

        let beta = ridge_fit(&design, &y, &penalties)
            .ok_or_else(|| ForecastError::fit_failure(MODEL, "trend system is not positive definite"))?;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ForecastError::fit_failure(MODEL, "non-finite trend coefficients"));
        }

        let sse: f64 = design
            .iter()
            .zip(&y)
            .map(|(row, yi)| {
                let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
                (yi - fitted).powi(2)
            })
            .sum();
        let sigma = (sse / t.len() as f64).sqrt() * y_scale;

        tracing::debug!(
            k = beta[1],
            m = beta[0],
            changepoints = changepoints.len(),
            sigma,
            "fitted changepoint trend"
        );

        Ok(FittedTrend {
            start,
            span_days,
            y_scale,
            k: beta[1],
            m: beta[0],
            deltas: beta[2..].to_vec(),
            changepoints,
            sigma,
            z: normal_critical_value(self.config.interval_width),
        })
    }
}

impl FittedTrend {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// Trend value at `date` on the original scale.
    pub fn trend_at(&self, date: NaiveDate) -> f64 {
        let t = self.scaled_time(date);
        let bends: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        (self.k * t + self.m + bends) * self.y_scale
    }

    /// `(yhat, yhat_lower, yhat_upper)` at `date` for the configured interval width.
    pub fn predict(&self, date: NaiveDate) -> (f64, f64, f64) {
        let yhat = self.trend_at(date);
        let half = self.z * self.sigma;
        (yhat, yhat - half, yhat + half)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Slope changes at each changepoint on the scaled axes.
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }
}
