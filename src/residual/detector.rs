//! Residual outlier detection
//!
//! Z-scores each residual sample against the residual series' own mean and
//! std. The sign of the z-score picks spike vs drop. A secondary
//! trend-acceleration signal and a seasonal-profile extractor are exposed
//! but not part of the default ensemble.

use std::collections::HashMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::decompose::decompose;
use crate::anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, Severity};
use crate::baseline::stats::{mean, std_dev};
use crate::record::ConsumptionRecord;
use crate::site::Site;

/// Daily cycle for hourly data.
pub const DEFAULT_SEASONAL_PERIOD: usize = 24;

/// Residual z-score needed to flag a sample.
pub const DEFAULT_RESIDUAL_THRESHOLD: f64 = 3.0;

/// Trend-acceleration window (one week of hourly data).
pub const DEFAULT_TREND_WINDOW: usize = 168;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualDetector {
    pub seasonal_period: usize,
    pub residual_threshold: f64,
}

impl Default for ResidualDetector {
    fn default() -> Self {
        Self {
            seasonal_period: DEFAULT_SEASONAL_PERIOD,
            residual_threshold: DEFAULT_RESIDUAL_THRESHOLD,
        }
    }
}

// ============================================================================
// SECONDARY SIGNALS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

/// Significant change in the trend component's slope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChange {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub site: Site,
    pub direction: TrendDirection,
    pub z_score: f64,
    pub description: String,
    pub recommendation: String,
}

/// Typical daily shape of a site's seasonal component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    pub site: Site,
    pub hourly_pattern: [f64; 24],
    pub peak_hour: u32,
    pub peak_value: f64,
    pub trough_hour: u32,
    pub trough_value: f64,
    pub amplitude: f64,
    pub mean_trend: f64,
}

impl ResidualDetector {
    pub fn new(seasonal_period: usize, residual_threshold: f64) -> Self {
        Self { seasonal_period, residual_threshold }
    }

    /// Capability check for the ensemble's detector registry.
    pub fn available(&self) -> bool {
        self.seasonal_period >= 2
    }

    // ------------------------------------------------------------------
    // DETECTION
    // ------------------------------------------------------------------

    /// Flag residual outliers per site. Sites with fewer than two seasonal
    /// periods of data decompose to the identity fallback and therefore
    /// produce no candidates.
    pub fn detect(
        &self,
        records: &[ConsumptionRecord],
        min_severity: Option<Severity>,
    ) -> Vec<AnomalyCandidate> {
        let mut candidates = Vec::new();

        for (site, site_records) in partition_by_site(records) {
            let series: Vec<f64> = site_records.iter().map(|r| r.total_kwh).collect();
            let components = decompose(&series, self.seasonal_period);

            let residual_mean = mean(&components.residual);
            let residual_std = std_dev(&components.residual);
            if residual_std == 0.0 {
                log::info!("Residual std is zero for site '{}', nothing to flag", site);
                continue;
            }

            for (i, record) in site_records.iter().enumerate() {
                let z = (components.residual[i] - residual_mean) / residual_std;
                if z.abs() < self.residual_threshold {
                    continue;
                }

                let severity = severity_for_abs_z(z.abs());
                if let Some(min) = min_severity {
                    if severity < min {
                        continue;
                    }
                }

                let actual = series[i];
                let expected = components.expected(i);
                let deviation_pct = if expected != 0.0 {
                    (actual - expected) / expected * 100.0
                } else {
                    0.0
                };

                let (anomaly_type, description, recommendation) = if z > 0.0 {
                    (
                        AnomalyType::ResidualSpike,
                        format!(
                            "Abnormally high consumption of {:.2} kWh \
                             (expected {:.2} kWh from trend and seasonality)",
                            actual, expected
                        ),
                        "Investigate the increase. Check for a special event \
                         or an equipment fault."
                            .to_string(),
                    )
                } else {
                    (
                        AnomalyType::ResidualDrop,
                        format!(
                            "Abnormally low consumption of {:.2} kWh \
                             (expected {:.2} kWh)",
                            actual, expected
                        ),
                        "Check for an unscheduled closure or a metering fault."
                            .to_string(),
                    )
                };

                candidates.push(AnomalyCandidate {
                    timestamp: record.timestamp,
                    site: site.clone(),
                    sector: None,
                    anomaly_type,
                    severity,
                    actual_value: actual,
                    expected_value: expected,
                    deviation_pct,
                    z_score: Some(z),
                    description,
                    recommendation,
                    potential_savings_kwh: AnomalyCandidate::savings(actual, expected),
                    detected_by: DetectorKind::Residual,
                });
            }
        }

        log::info!("Residual detector flagged {} candidates", candidates.len());
        candidates
    }

    /// Secondary signal: z-scored second difference of the trend component.
    /// Not part of the default ensemble.
    pub fn detect_trend_changes(&self, records: &[ConsumptionRecord]) -> Vec<TrendChange> {
        let mut changes = Vec::new();

        for (site, site_records) in partition_by_site(records) {
            if site_records.len() < DEFAULT_TREND_WINDOW * 2 {
                continue;
            }

            let series: Vec<f64> = site_records.iter().map(|r| r.total_kwh).collect();
            let trend = decompose(&series, self.seasonal_period).trend;

            // Second difference = slope acceleration.
            let accel: Vec<f64> = trend
                .windows(3)
                .map(|w| (w[2] - w[1]) - (w[1] - w[0]))
                .collect();
            let accel_std = std_dev(&accel);
            if accel_std == 0.0 {
                continue;
            }

            for (i, a) in accel.iter().enumerate() {
                let z = a / accel_std;
                if z.abs() < DEFAULT_RESIDUAL_THRESHOLD {
                    continue;
                }
                let direction = if z > 0.0 {
                    TrendDirection::Increasing
                } else {
                    TrendDirection::Decreasing
                };
                changes.push(TrendChange {
                    // accel[i] corresponds to series index i + 2
                    timestamp: site_records[i + 2].timestamp,
                    site: site.clone(),
                    direction,
                    z_score: z,
                    description: format!(
                        "Significant change in the consumption trend ({})",
                        match direction {
                            TrendDirection::Increasing => "increasing",
                            TrendDirection::Decreasing => "decreasing",
                        }
                    ),
                    recommendation: "Review recent changes in operations or infrastructure."
                        .to_string(),
                });
            }
        }

        changes
    }

    /// Typical seasonal shape for one site; `None` with under two periods
    /// of data.
    pub fn seasonal_pattern(
        &self,
        records: &[ConsumptionRecord],
        site: &Site,
    ) -> Option<SeasonalPattern> {
        let partitions = partition_by_site(records);
        let site_records = partitions.iter().find(|(s, _)| s == site).map(|(_, r)| r)?;
        if site_records.len() < self.seasonal_period * 2 {
            return None;
        }

        let series: Vec<f64> = site_records.iter().map(|r| r.total_kwh).collect();
        let components = decompose(&series, self.seasonal_period);

        let mut sums = [0.0f64; 24];
        let mut counts = [0usize; 24];
        for (i, record) in site_records.iter().enumerate() {
            let hour = record.timestamp.hour() as usize;
            sums[hour] += components.seasonal[i];
            counts[hour] += 1;
        }
        let mut hourly_pattern = [0.0f64; 24];
        for hour in 0..24 {
            if counts[hour] > 0 {
                hourly_pattern[hour] = sums[hour] / counts[hour] as f64;
            }
        }

        let (peak_hour, peak_value) = hourly_pattern
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        let (trough_hour, trough_value) = hourly_pattern
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;

        Some(SeasonalPattern {
            site: site.clone(),
            hourly_pattern,
            peak_hour: peak_hour as u32,
            peak_value: *peak_value,
            trough_hour: trough_hour as u32,
            trough_value: *trough_value,
            amplitude: peak_value - trough_value,
            mean_trend: mean(&components.trend),
        })
    }
}

/// Severity tiers over |z|, only reachable past the detection threshold.
fn severity_for_abs_z(abs_z: f64) -> Severity {
    if abs_z >= 5.0 {
        Severity::Critical
    } else if abs_z >= 4.0 {
        Severity::High
    } else if abs_z >= 3.5 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Split into per-site runs sorted by timestamp, sites in stable order.
fn partition_by_site(records: &[ConsumptionRecord]) -> Vec<(Site, Vec<ConsumptionRecord>)> {
    let mut by_site: HashMap<Site, Vec<ConsumptionRecord>> = HashMap::new();
    for record in records {
        by_site.entry(record.site.clone()).or_default().push(record.clone());
    }

    let mut partitions: Vec<(Site, Vec<ConsumptionRecord>)> = by_site.into_iter().collect();
    partitions.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, site_records) in &mut partitions {
        site_records.sort_by_key(|r| r.timestamp);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testutil::{hourly_dataset, record, site, start_of_2024};

    #[test]
    fn test_short_series_yields_no_candidates() {
        let s = site("Tunja");
        let start = start_of_2024();
        let records: Vec<_> = (0..40)
            .map(|i| record(&s, start + Duration::hours(i), 100.0 + i as f64))
            .collect();

        let detector = ResidualDetector::default();
        assert!(detector.detect(&records, None).is_empty());
    }

    #[test]
    fn test_flat_series_yields_no_candidates() {
        let s = site("Tunja");
        let start = start_of_2024();
        let records: Vec<_> = (0..96)
            .map(|i| record(&s, start + Duration::hours(i), 100.0))
            .collect();

        let detector = ResidualDetector::default();
        assert!(detector.detect(&records, None).is_empty());
    }

    #[test]
    fn test_injected_spike_is_flagged() {
        let s = site("Tunja");
        let mut records = hourly_dataset(&s, 14, 100.0, 11);
        // Quadruple one mid-dataset afternoon reading.
        records[7 * 24 + 14].total_kwh *= 4.0;
        let spiked_ts = records[7 * 24 + 14].timestamp;

        let detector = ResidualDetector::default();
        let found = detector.detect(&records, None);

        let spike = found
            .iter()
            .find(|c| c.timestamp == spiked_ts)
            .expect("injected spike not flagged");
        assert_eq!(spike.anomaly_type, AnomalyType::ResidualSpike);
        assert!(spike.z_score.unwrap() > 3.0);
        assert!(spike.potential_savings_kwh > 0.0);
    }

    #[test]
    fn test_injected_drop_is_flagged_as_drop() {
        let s = site("Tunja");
        let mut records = hourly_dataset(&s, 14, 100.0, 12);
        records[7 * 24 + 14].total_kwh = 0.0;
        let dropped_ts = records[7 * 24 + 14].timestamp;

        let detector = ResidualDetector::default();
        let found = detector.detect(&records, None);

        let drop = found
            .iter()
            .find(|c| c.timestamp == dropped_ts)
            .expect("injected drop not flagged");
        assert_eq!(drop.anomaly_type, AnomalyType::ResidualDrop);
        assert!(drop.z_score.unwrap() < -3.0);
        // actual < expected: savings clamp at zero
        assert_eq!(drop.potential_savings_kwh, 0.0);
    }

    #[test]
    fn test_severity_tiers_over_abs_z() {
        assert_eq!(severity_for_abs_z(3.2), Severity::Low);
        assert_eq!(severity_for_abs_z(3.5), Severity::Medium);
        assert_eq!(severity_for_abs_z(4.0), Severity::High);
        assert_eq!(severity_for_abs_z(5.0), Severity::Critical);
    }

    #[test]
    fn test_seasonal_pattern_peak_in_working_hours() {
        let s = site("Tunja");
        let records = hourly_dataset(&s, 14, 100.0, 13);

        let detector = ResidualDetector::default();
        let pattern = detector.seasonal_pattern(&records, &s).expect("pattern expected");
        assert!((7..=18).contains(&pattern.peak_hour), "peak at {}", pattern.peak_hour);
        assert!(pattern.amplitude > 0.0);
    }

    #[test]
    fn test_trend_change_detected_on_regime_shift() {
        let s = site("Tunja");
        // Three weeks flat, then the level doubles.
        let mut records = hourly_dataset(&s, 21, 100.0, 14);
        records.extend(
            hourly_dataset(&s, 21, 200.0, 15).into_iter().map(|mut r| {
                r.timestamp = r.timestamp + Duration::days(21);
                r
            }),
        );

        let detector = ResidualDetector::default();
        let changes = detector.detect_trend_changes(&records);
        assert!(
            changes.iter().any(|c| c.direction == TrendDirection::Increasing),
            "expected an increasing trend change, got {}",
            changes.len()
        );
    }
}
