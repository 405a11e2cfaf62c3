//! Differencing utilities for ARIMA models.

/// Apply `d` rounds of first differencing.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values forecast past the end of
/// `original`.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();

    for level in (0..d).rev() {
        // Last observed value at this differencing level anchors the cumsum.
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(anchor, |acc, &step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }

    result
}
