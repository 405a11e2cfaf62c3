//! Bounded Nelder-Mead minimizer used for ARIMA parameter estimation.

use std::cmp::Ordering;

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop once the spread of objective values falls below this.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Relative step used to build the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

struct Bounds<'a>(Option<&'a [(f64, f64)]>);

impl Bounds<'_> {
    fn project(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = self.0 {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }
}

/// `from + t * (to - from)`, projected into the bounds.
fn lerp(from: &[f64], to: &[f64], t: f64, bounds: &Bounds<'_>) -> Vec<f64> {
    bounds.project(from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect())
}

fn by_value(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Minimize `objective` starting from `initial`.
///
/// Each coordinate is clamped to its `(min, max)` pair when `bounds` is given.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let bounds = Bounds(bounds);
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    let start = bounds.project(initial.to_vec());
    simplex.push((start.clone(), objective(&start)));
    for i in 0..n {
        let mut vertex = start.clone();
        vertex[i] += if vertex[i].abs() > 1e-10 {
            config.initial_step * vertex[i].abs()
        } else {
            config.initial_step
        };
        let vertex = bounds.project(vertex);
        let value = objective(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort_by(|a, b| by_value(&a.1, &b.1));

        let best = simplex[0].1;
        let worst = simplex[n].1;
        if (worst - best).abs() < config.tolerance {
            converged = true;
            break;
        }

        let mut centroid = vec![0.0; n];
        for (vertex, _) in &simplex[..n] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / n as f64;
            }
        }

        let reflected = lerp(&centroid, &simplex[n].0, -config.alpha, &bounds);
        let reflected_value = objective(&reflected);

        if reflected_value < best {
            let expanded = lerp(&centroid, &reflected, config.gamma, &bounds);
            let expanded_value = objective(&expanded);
            simplex[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < simplex[n - 1].1 {
            simplex[n] = (reflected, reflected_value);
            continue;
        }

        let (toward, toward_value) = if reflected_value < worst {
            (reflected, reflected_value)
        } else {
            (simplex[n].0.clone(), worst)
        };
        let contracted = lerp(&centroid, &toward, config.rho, &bounds);
        let contracted_value = objective(&contracted);
        if contracted_value < toward_value {
            simplex[n] = (contracted, contracted_value);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            *vertex = lerp(&anchor, vertex, config.sigma, &bounds);
            *value = objective(vertex);
        }
    }

    let (optimal_point, optimal_value) = simplex
        .into_iter()
        .min_by(|a, b| by_value(&a.1, &b.1))
        .unwrap_or((start, f64::NAN));

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}
