//! Least-squares fitting used by the trend engines.

/// Straight line fitted over the point index `0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Value of the line at index `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// In-sample residuals `y - ŷ`.
    pub fn residuals(&self, y: &[f64]) -> Vec<f64> {
        y.iter()
            .enumerate()
            .map(|(i, &yi)| yi - self.at(i as f64))
            .collect()
    }
}

/// Closed-form OLS of `y` on its index.
///
/// Returns `None` for fewer than two points.
pub fn linear_fit(y: &[f64]) -> Option<LinearFit> {
    let n = y.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (yi - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Penalized least squares: minimize `||y - Xβ||² + Σ penalty_j β_j²`.
///
/// `design` is row-major with one row per observation. Solves the normal
/// equations with a Cholesky factorization; returns `None` when the system is
/// not positive definite or the dimensions disagree.
pub fn ridge_fit(design: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Option<Vec<f64>> {
    let k = penalties.len();
    if design.len() != y.len() || design.iter().any(|row| row.len() != k) {
        return None;
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in design.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        xtx[i][i] += penalties[i] + 1e-10;
    }

    solve_symmetric(&xtx, &xty)
}

/// Solve symmetric positive definite system using Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L @ L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).fold(b[i], |acc, j| acc - l[i][j] * y[j]);
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).fold(y[i], |acc, j| acc - l[j][i] * x[j]);
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_fit_recovers_exact_line() {
        // y = 2 + 3x
        let y = vec![2.0, 5.0, 8.0, 11.0, 14.0];
        let fit = linear_fit(&y).unwrap();
        assert_relative_eq!(fit.slope, 3.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.at(5.0), 17.0, epsilon = 1e-12);
        assert!(fit.residuals(&y).iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn linear_fit_needs_two_points() {
        assert!(linear_fit(&[1.0]).is_none());
        assert!(linear_fit(&[]).is_none());
    }

    #[test]
    fn linear_fit_of_constant_is_flat() {
        let fit = linear_fit(&[4.0; 6]).unwrap();
        assert_relative_eq!(fit.slope, 0.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn ridge_without_penalty_matches_ols() {
        // y = 1 + 2*x
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let design: Vec<Vec<f64>> = xs.iter().map(|&x| vec![1.0, x]).collect();
        let y: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();

        let beta = ridge_fit(&design, &y, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn heavy_penalty_shrinks_coefficient() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let design: Vec<Vec<f64>> = xs.iter().map(|&x| vec![1.0, x]).collect();
        let y: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();

        let beta = ridge_fit(&design, &y, &[0.0, 1e9]).unwrap();
        assert!(beta[1].abs() < 1e-6);
    }

    #[test]
    fn ridge_rejects_mismatched_dimensions() {
        let design = vec![vec![1.0, 0.0], vec![1.0]];
        assert!(ridge_fit(&design, &[1.0, 2.0], &[0.0, 0.0]).is_none());
        assert!(ridge_fit(&[vec![1.0]], &[1.0, 2.0], &[0.0]).is_none());
    }
}
