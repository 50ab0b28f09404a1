//! Seasonal-trend decomposition
//!
//! Classical additive decomposition: centered moving-average trend,
//! per-phase seasonal means centered to zero, residual = series - trend -
//! seasonal. A series shorter than two full periods cannot be decomposed
//! and falls back to the identity (trend = series, seasonal = residual = 0)
//! instead of failing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// Value the model expects at index `i`: trend plus seasonal.
    pub fn expected(&self, i: usize) -> f64 {
        self.trend[i] + self.seasonal[i]
    }

    fn identity(series: &[f64]) -> Self {
        Self {
            trend: series.to_vec(),
            seasonal: vec![0.0; series.len()],
            residual: vec![0.0; series.len()],
        }
    }
}

/// Decompose `series` under a fixed seasonal period.
pub fn decompose(series: &[f64], period: usize) -> Decomposition {
    if period < 2 || series.len() < period * 2 {
        log::info!(
            "Series too short for decomposition ({} < {}), using identity fallback",
            series.len(),
            period * 2
        );
        return Decomposition::identity(series);
    }

    let trend = moving_average_trend(series, period);

    // Per-phase seasonal means of the detrended series, centered to zero
    // so the seasonal component carries no level.
    let mut phase_sums = vec![0.0f64; period];
    let mut phase_counts = vec![0usize; period];
    for (i, value) in series.iter().enumerate() {
        let detrended = value - trend[i];
        phase_sums[i % period] += detrended;
        phase_counts[i % period] += 1;
    }
    let mut phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(sum, count)| if *count > 0 { sum / *count as f64 } else { 0.0 })
        .collect();
    let level = phase_means.iter().sum::<f64>() / period as f64;
    for mean in &mut phase_means {
        *mean -= level;
    }

    let seasonal: Vec<f64> = (0..series.len()).map(|i| phase_means[i % period]).collect();
    let residual: Vec<f64> = series
        .iter()
        .enumerate()
        .map(|(i, value)| value - trend[i] - seasonal[i])
        .collect();

    Decomposition { trend, seasonal, residual }
}

/// Centered moving average of window `period`; even periods use the
/// standard 2x(period) average with half weights at the window ends.
/// Edges are padded with the nearest interior value.
fn moving_average_trend(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for center in half..n.saturating_sub(half) {
        let value = if period % 2 == 0 {
            // Window of period+1 points, half weight at both ends.
            let mut sum = 0.5 * series[center - half] + 0.5 * series[center + half];
            for i in (center - half + 1)..(center + half) {
                sum += series[i];
            }
            sum / period as f64
        } else {
            let mut sum = 0.0;
            for i in (center - half)..=(center + half) {
                sum += series[i];
            }
            sum / period as f64
        };
        trend[center] = value;
    }

    // Pad the undefined edges with the nearest computed value.
    let first_valid = trend.iter().position(|v| v.is_finite());
    let last_valid = trend.iter().rposition(|v| v.is_finite());
    if let (Some(first), Some(last)) = (first_valid, last_valid) {
        for i in 0..first {
            trend[i] = trend[first];
        }
        for i in (last + 1)..n {
            trend[i] = trend[last];
        }
    } else {
        // period covers the whole series; fall back to its mean
        let mean = series.iter().sum::<f64>() / n as f64;
        trend.iter_mut().for_each(|v| *v = mean);
    }

    trend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_identity_fallback() {
        let series: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let d = decompose(&series, 24);
        assert_eq!(d.trend, series);
        assert!(d.seasonal.iter().all(|v| *v == 0.0));
        assert!(d.residual.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_components_sum_back_to_series() {
        let series: Vec<f64> = (0..96)
            .map(|i| 100.0 + 10.0 * ((i % 24) as f64 / 24.0 * std::f64::consts::TAU).sin())
            .collect();
        let d = decompose(&series, 24);
        for i in 0..series.len() {
            let rebuilt = d.trend[i] + d.seasonal[i] + d.residual[i];
            assert!((rebuilt - series[i]).abs() < 1e-9, "index {}", i);
        }
    }

    #[test]
    fn test_seasonal_component_is_centered() {
        let series: Vec<f64> = (0..240)
            .map(|i| 50.0 + 20.0 * ((i % 24) as f64 / 24.0 * std::f64::consts::TAU).cos())
            .collect();
        let d = decompose(&series, 24);
        let seasonal_mean: f64 =
            d.seasonal[..24].iter().sum::<f64>() / 24.0;
        assert!(seasonal_mean.abs() < 1e-9);
    }

    #[test]
    fn test_pure_seasonal_series_has_tiny_residuals() {
        let series: Vec<f64> = (0..240)
            .map(|i| 100.0 + 15.0 * ((i % 24) as f64 / 24.0 * std::f64::consts::TAU).sin())
            .collect();
        let d = decompose(&series, 24);
        // Away from the padded edges the fit should be near-exact.
        for i in 24..216 {
            assert!(d.residual[i].abs() < 1.0, "residual {} at {}", d.residual[i], i);
        }
    }

    #[test]
    fn test_trend_follows_level_shift() {
        // Flat 100 for 5 days, then flat 200 for 5 days.
        let mut series = vec![100.0; 120];
        series.extend(vec![200.0; 120]);
        let d = decompose(&series, 24);
        assert!(d.trend[30] < 110.0);
        assert!(d.trend[200] > 190.0);
    }
}
