//! Descriptive statistics over value slices.

use statrs::distribution::{ContinuousCDF, Normal};

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum()
}

/// Population standard deviation (n denominator).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (sum_sq_dev(values) / values.len() as f64).sqrt()
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    (sum_sq_dev(values) / (values.len() - 1) as f64).sqrt()
}

/// Two-sided standard normal critical value for a central interval.
///
/// `interval_width = 0.95` gives roughly 1.96.
pub fn normal_critical_value(interval_width: f64) -> f64 {
    if !(0.0..1.0).contains(&interval_width) {
        return f64::NAN;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(0.5 + interval_width / 2.0),
        Err(_) => f64::NAN,
    }
}
