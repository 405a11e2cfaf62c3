//! ARIMA (Autoregressive Integrated Moving Average) estimator.

use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// ARIMA model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest series the conditional sum of squares can be computed on.
    pub fn min_len(&self) -> usize {
        self.d + self.p.max(self.q) + 2
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Unfitted ARIMA(p, d, q) estimator.
///
/// Coefficients are estimated by minimizing the conditional sum of squares
/// on the differenced series with a bounded Nelder-Mead search, keeping AR and
/// MA terms inside (-1, 1).
#[derive(Debug, Clone, Default)]
pub struct Arima {
    order: ArimaOrder,
}

/// ARIMA model with estimated coefficients, ready to forecast.
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    original: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    residual_variance: f64,
}

/// One-step predictions and residuals of an ARMA recursion.
fn arma_residuals(diff: &[f64], ar: &[f64], ma: &[f64], intercept: f64) -> Vec<f64> {
    let start = ar.len().max(ma.len());
    let mut residuals = vec![0.0; diff.len()];

    for t in start..diff.len() {
        let mut pred = intercept;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * (diff[t - 1 - i] - intercept);
        }
        for (i, theta) in ma.iter().enumerate() {
            pred += theta * residuals[t - 1 - i];
        }
        residuals[t] = diff[t] - pred;
    }

    residuals
}

impl Arima {
    pub fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimate coefficients for `values`.
    pub fn fit(&self, values: &[f64]) -> Result<FittedArima> {
        let ArimaOrder { p, d, q } = self.order;
        let needed = self.order.min_len();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let differenced = difference(values, d);
        let mean = differenced.iter().sum::<f64>() / differenced.len() as f64;
        let start = p.max(q);

        let (intercept, ar, ma) = if p == 0 && q == 0 {
            (mean, vec![], vec![])
        } else {
            // Layout: [intercept, ar_1..ar_p, ma_1..ma_q]
            let mut initial = vec![mean];
            initial.extend((0..p).map(|i| 0.1 / (i + 1) as f64));
            initial.extend((0..q).map(|i| 0.1 / (i + 1) as f64));

            let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
            bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

            let result = nelder_mead(
                |params| {
                    let residuals =
                        arma_residuals(&differenced, &params[1..1 + p], &params[1 + p..], params[0]);
                    residuals[start..].iter().map(|e| e * e).sum()
                },
                &initial,
                Some(&bounds),
                NelderMeadConfig::default(),
            );

            let point = result.optimal_point;
            (point[0], point[1..1 + p].to_vec(), point[1 + p..].to_vec())
        };

        let residuals = arma_residuals(&differenced, &ar, &ma, intercept);
        let effective = &residuals[start..];
        let residual_variance =
            effective.iter().map(|e| e * e).sum::<f64>() / effective.len().max(1) as f64;

        if !intercept.is_finite() || ar.iter().chain(&ma).any(|c| !c.is_finite()) {
            return Err(ForecastError::fit_failure(
                "arima",
                "parameter estimation did not produce finite coefficients",
            ));
        }

        tracing::debug!(
            order = %self.order,
            intercept,
            ?ar,
            ?ma,
            residual_variance,
            "fitted ARIMA"
        );

        Ok(FittedArima {
            order: self.order,
            ar,
            ma,
            intercept,
            original: values.to_vec(),
            differenced,
            residuals,
            residual_variance,
        })
    }
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Point forecasts for `horizon` steps on the original scale.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        if horizon == 0 {
            return Vec::new();
        }

        let mut diff = self.differenced.clone();
        let mut residuals = self.residuals.clone();

        for _ in 0..horizon {
            let t = diff.len();
            let mut pred = self.intercept;
            for (i, phi) in self.ar.iter().enumerate() {
                if t > i {
                    pred += phi * (diff[t - 1 - i] - self.intercept);
                }
            }
            for (i, theta) in self.ma.iter().enumerate() {
                if t > i {
                    pred += theta * residuals[t - 1 - i];
                }
            }
            diff.push(pred);
            // Future shocks have zero expectation.
            residuals.push(0.0);
        }

        let ahead = &diff[self.differenced.len()..];
        integrate(ahead, &self.original, self.order.d)
    }
}
