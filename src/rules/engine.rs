//! Rule evaluation
//!
//! Batch mode walks every record against every rule; the real-time path
//! evaluates the configured subset against one record and the cached
//! baseline only. Each rule emits at most one candidate per record; a
//! record may trigger several rules at once.

use std::collections::HashSet;

use chrono::{Datelike, Weekday};

use super::config::{RuleKind, RuleSet};
use crate::anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, Severity};
use crate::baseline::{Baseline, BaselineSet};
use crate::record::ConsumptionRecord;

#[derive(Debug, Clone, Default)]
pub struct RulesDetector {
    rules: RuleSet,
}

impl RulesDetector {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn available(&self) -> bool {
        true
    }

    // ------------------------------------------------------------------
    // BATCH MODE
    // ------------------------------------------------------------------

    /// Evaluate every rule over every record. Sites without a fitted
    /// baseline are skipped with a warning; detection continues for the
    /// rest of the dataset.
    pub fn detect(
        &self,
        baselines: &BaselineSet,
        records: &[ConsumptionRecord],
        min_severity: Option<Severity>,
    ) -> Vec<AnomalyCandidate> {
        let mut candidates = Vec::new();
        let mut missing: HashSet<&crate::site::Site> = HashSet::new();

        for record in records {
            let baseline = match baselines.get(&record.site) {
                Some(b) => b,
                None => {
                    if missing.insert(&record.site) {
                        log::warn!("No baseline for site '{}', skipping", record.site);
                    }
                    continue;
                }
            };

            for kind in RuleKind::ALL {
                if let Some(candidate) =
                    self.evaluate(kind, baseline, record, DetectorKind::Rules)
                {
                    candidates.push(candidate);
                }
            }
        }

        if let Some(min) = min_severity {
            candidates.retain(|c| c.severity >= min);
        }

        log::info!("Rules detector flagged {} candidates", candidates.len());
        candidates
    }

    // ------------------------------------------------------------------
    // REAL-TIME SINGLE-RECORD PATH
    // ------------------------------------------------------------------

    /// Evaluate the configured real-time rule subset against one record.
    /// Cost is proportional to the number of active rules only.
    pub fn detect_record(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
    ) -> Vec<AnomalyCandidate> {
        self.rules
            .realtime_rules
            .iter()
            .filter_map(|kind| self.evaluate(*kind, baseline, record, DetectorKind::RulesRealtime))
            .collect()
    }

    fn evaluate(
        &self,
        kind: RuleKind,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        match kind {
            RuleKind::OffHours => self.check_off_hours(baseline, record, detected_by),
            RuleKind::Weekend => self.check_weekend(baseline, record, detected_by),
            RuleKind::Spike => self.check_spike(baseline, record, detected_by),
            RuleKind::Occupancy => self.check_occupancy(baseline, record, detected_by),
            RuleKind::Holiday => self.check_holiday(baseline, record, detected_by),
            RuleKind::Vacation => self.check_vacation(baseline, record, detected_by),
        }
    }

    // ------------------------------------------------------------------
    // INDIVIDUAL RULES
    // ------------------------------------------------------------------

    fn check_off_hours(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.off_hours;
        if !rule.contains_hour(record.hour()) {
            return None;
        }

        let working = baseline.working_hours_mean;
        if working <= 0.0 {
            return None;
        }

        let threshold = working * rule.threshold_multiplier;
        let expected = baseline.non_working_mean;
        let actual = record.total_kwh;
        if actual <= threshold {
            return None;
        }

        let deviation_pct = (actual - threshold) / threshold * 100.0;
        let ratio = actual / working;

        Some(self.candidate(
            record,
            AnomalyType::OffHoursUsage,
            rule.severity.severity_for(ratio),
            actual,
            expected,
            deviation_pct,
            None,
            format!(
                "Consumption of {:.2} kWh at {:02}:00, expected at most {:.2} kWh",
                actual,
                record.hour(),
                threshold
            ),
            "Check for equipment left running outside working hours. \
             Consider installing automatic timers."
                .to_string(),
            detected_by,
        ))
    }

    fn check_weekend(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.weekend;
        if !record.is_weekend_day() {
            return None;
        }

        let weekday_mean = baseline.weekday_mean;
        if weekday_mean <= 0.0 {
            return None;
        }

        let threshold = weekday_mean * rule.threshold_multiplier;
        let expected = baseline.weekend_mean;
        let actual = record.total_kwh;
        if actual <= threshold {
            return None;
        }

        let deviation_pct = (actual - threshold) / threshold * 100.0;
        let ratio = actual / weekday_mean;
        let day_name = if record.timestamp.weekday() == Weekday::Sat {
            "Saturday"
        } else {
            "Sunday"
        };

        Some(self.candidate(
            record,
            AnomalyType::WeekendAnomaly,
            rule.severity.severity_for(ratio),
            actual,
            expected,
            deviation_pct,
            None,
            format!(
                "Consumption of {:.2} kWh on {}, expected at most {:.2} kWh",
                actual, day_name, threshold
            ),
            "Verify non-essential equipment is switched off. \
             Establish a weekend shutdown protocol."
                .to_string(),
            detected_by,
        ))
    }

    fn check_spike(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.spike;
        let actual = record.total_kwh;

        // Zero-variance sites have no z-score: spike detection disabled.
        let z = baseline.z_score(actual)?;
        if z < rule.z_score_threshold {
            return None;
        }

        if baseline.mean <= 0.0 {
            return None;
        }
        let deviation_pct = (actual - baseline.mean) / baseline.mean * 100.0;
        if deviation_pct < rule.min_deviation_pct {
            return None;
        }

        Some(self.candidate(
            record,
            AnomalyType::ConsumptionSpike,
            rule.severity.severity_for(z),
            actual,
            baseline.mean,
            deviation_pct,
            Some(z),
            format!(
                "Consumption spike of {:.2} kWh (z-score {:.1}, {:.0}% above average)",
                actual, z, deviation_pct
            ),
            "Investigate the cause of the spike. Check for simultaneous \
             start-up of high-power equipment."
                .to_string(),
            detected_by,
        ))
    }

    fn check_occupancy(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.occupancy;
        let occupancy = record.occupancy_pct;
        if !occupancy.is_finite() || occupancy >= rule.occupancy_threshold_pct {
            return None;
        }
        if baseline.mean <= 0.0 {
            return None;
        }

        let expected = baseline.mean * (occupancy / 100.0);
        let threshold = baseline.mean * rule.consumption_multiplier;
        let actual = record.total_kwh;
        if actual <= threshold {
            return None;
        }

        let deviation_pct = if expected > 0.0 {
            (actual - expected) / expected * 100.0
        } else {
            100.0
        };
        let ratio = actual / baseline.mean;

        Some(self.candidate(
            record,
            AnomalyType::OccupancyImbalance,
            rule.severity.severity_for(ratio),
            actual,
            expected,
            deviation_pct,
            None,
            format!(
                "Consumption of {:.2} kWh with only {:.0}% occupancy, expected {:.2} kWh",
                actual, occupancy, expected
            ),
            "Review HVAC setpoints against actual occupancy. \
             Consider presence sensors."
                .to_string(),
            detected_by,
        ))
    }

    fn check_holiday(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.holiday;
        if !record.flags.is_holiday {
            return None;
        }
        if baseline.mean <= 0.0 {
            return None;
        }

        let expected = baseline.mean * rule.threshold_multiplier;
        let actual = record.total_kwh;
        if actual <= expected {
            return None;
        }

        let deviation_pct = (actual - expected) / expected * 100.0;
        let ratio = actual / baseline.mean;

        Some(self.candidate(
            record,
            AnomalyType::HolidayConsumption,
            rule.severity.severity_for(ratio),
            actual,
            expected,
            deviation_pct,
            None,
            format!(
                "Consumption of {:.2} kWh on a holiday, expected at most {:.2} kWh",
                actual, expected
            ),
            "Check equipment running on holidays. \
             Enforce the holiday shutdown protocol."
                .to_string(),
            detected_by,
        ))
    }

    fn check_vacation(
        &self,
        baseline: &Baseline,
        record: &ConsumptionRecord,
        detected_by: DetectorKind,
    ) -> Option<AnomalyCandidate> {
        let rule = &self.rules.vacation;
        if !record.period.is_vacation() {
            return None;
        }
        if baseline.mean <= 0.0 {
            return None;
        }

        let expected = baseline.mean * rule.threshold_multiplier;
        let actual = record.total_kwh;
        if actual <= expected {
            return None;
        }

        let deviation_pct = (actual - expected) / expected * 100.0;
        let ratio = actual / baseline.mean;

        Some(self.candidate(
            record,
            AnomalyType::VacationHigh,
            rule.severity.severity_for(ratio),
            actual,
            expected,
            deviation_pct,
            None,
            format!(
                "Consumption of {:.2} kWh during an academic break, expected at most {:.2} kWh",
                actual, expected
            ),
            "Review equipment left running over the break. \
             Good window for preventive maintenance."
                .to_string(),
            detected_by,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn candidate(
        &self,
        record: &ConsumptionRecord,
        anomaly_type: AnomalyType,
        severity: Severity,
        actual: f64,
        expected: f64,
        deviation_pct: f64,
        z_score: Option<f64>,
        description: String,
        recommendation: String,
        detected_by: DetectorKind,
    ) -> AnomalyCandidate {
        AnomalyCandidate {
            timestamp: record.timestamp,
            site: record.site.clone(),
            sector: None,
            anomaly_type,
            severity,
            actual_value: actual,
            expected_value: expected,
            deviation_pct,
            z_score,
            description,
            recommendation,
            potential_savings_kwh: AnomalyCandidate::savings(actual, expected),
            detected_by,
        }
    }
}
