//! Descriptive statistics helpers
//!
//! Sample standard deviation (n-1 denominator) and linearly interpolated
//! percentiles, matching how the historical aggregates were originally
//! calibrated. All helpers tolerate empty input by returning a caller
//! fallback instead of NaN.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean with an explicit fallback for empty input.
pub fn mean_or(values: &[f64], fallback: f64) -> f64 {
    if values.is_empty() {
        fallback
    } else {
        mean(values)
    }
}

/// Sample standard deviation. Fewer than two samples yields 0.0, which
/// downstream z-score rules treat as "no spike detectable".
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation, q in [0, 1].
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = pos - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-9);
        // Sample std of the classic example is ~2.138
        assert!((std_dev(&values) - 2.1380899).abs() < 1e-6);
    }

    #[test]
    fn test_std_of_constant_series_is_zero() {
        let values = [5.0; 10];
        assert_eq!(std_dev(&values), 0.0);
    }

    #[test]
    fn test_std_of_short_series_is_zero() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((median(&values) - 2.5).abs() < 1e-9);
        assert!((percentile(&values, 0.95) - 3.85).abs() < 1e-9);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 4.0);
    }

    #[test]
    fn test_mean_or_fallback() {
        assert_eq!(mean_or(&[], 42.0), 42.0);
        assert_eq!(mean_or(&[1.0, 3.0], 42.0), 2.0);
    }
}
