//! Rule thresholds & severity tables
//!
//! No detection logic here - only constants and configuration structs.
//! Defaults reproduce the calibration used in production; `RuleSet` is
//! injected into the detector so every threshold is tunable per deployment.

use serde::{Deserialize, Serialize};

use crate::anomaly::Severity;

// ============================================================================
// DEFAULT THRESHOLDS (Constants)
// ============================================================================

/// Off-hours window: 22:00 through 05:59.
pub const OFF_HOURS_START: u32 = 22;
pub const OFF_HOURS_END: u32 = 6;

/// Off-hours usage may reach at most 35% of the working-hours mean.
pub const OFF_HOURS_MULTIPLIER: f64 = 0.35;

/// Weekend usage may reach at most 40% of the weekday mean.
pub const WEEKEND_MULTIPLIER: f64 = 0.40;

/// Spike detection: z-score gate and minimum deviation over the mean.
pub const SPIKE_Z_THRESHOLD: f64 = 3.0;
pub const SPIKE_MIN_DEVIATION_PCT: f64 = 50.0;

/// Occupancy-imbalance gate: below 30% occupancy, consuming more than 70%
/// of the global mean is flagged.
pub const OCCUPANCY_THRESHOLD_PCT: f64 = 30.0;
pub const OCCUPANCY_CONSUMPTION_MULTIPLIER: f64 = 0.70;

/// Holiday usage may reach at most 30% of the global mean.
pub const HOLIDAY_MULTIPLIER: f64 = 0.30;

/// Vacation-period usage may reach at most 40% of the global mean.
pub const VACATION_MULTIPLIER: f64 = 0.40;

// ============================================================================
// SEVERITY TABLE
// ============================================================================

/// Monotone mapping from a deviation ratio (or z-score) to a severity tier.
/// The highest tier whose cutoff is <= the observed value wins; boundaries
/// are inclusive toward the higher tier. Below `low` the default is Low,
/// which only matters for rules whose trigger sits at the `low` cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityTable {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl SeverityTable {
    pub const fn new(low: f64, medium: f64, high: f64, critical: f64) -> Self {
        Self { low, medium, high, critical }
    }

    pub fn severity_for(&self, ratio: f64) -> Severity {
        if ratio >= self.critical {
            Severity::Critical
        } else if ratio >= self.high {
            Severity::High
        } else if ratio >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

// ============================================================================
// PER-RULE CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffHoursRule {
    pub start_hour: u32,
    pub end_hour: u32,
    pub threshold_multiplier: f64,
    pub severity: SeverityTable,
}

impl Default for OffHoursRule {
    fn default() -> Self {
        Self {
            start_hour: OFF_HOURS_START,
            end_hour: OFF_HOURS_END,
            threshold_multiplier: OFF_HOURS_MULTIPLIER,
            severity: SeverityTable::new(0.35, 0.50, 0.75, 1.0),
        }
    }
}

impl OffHoursRule {
    /// The window wraps midnight: [start, 24) plus [0, end).
    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour || hour < self.end_hour
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendRule {
    pub threshold_multiplier: f64,
    pub severity: SeverityTable,
}

impl Default for WeekendRule {
    fn default() -> Self {
        Self {
            threshold_multiplier: WEEKEND_MULTIPLIER,
            severity: SeverityTable::new(0.40, 0.60, 0.80, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeRule {
    pub z_score_threshold: f64,
    pub min_deviation_pct: f64,
    /// Tiers over the z-score, not a deviation ratio.
    pub severity: SeverityTable,
}

impl Default for SpikeRule {
    fn default() -> Self {
        Self {
            z_score_threshold: SPIKE_Z_THRESHOLD,
            min_deviation_pct: SPIKE_MIN_DEVIATION_PCT,
            severity: SeverityTable::new(3.0, 4.0, 5.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRule {
    pub occupancy_threshold_pct: f64,
    pub consumption_multiplier: f64,
    pub severity: SeverityTable,
}

impl Default for OccupancyRule {
    fn default() -> Self {
        Self {
            occupancy_threshold_pct: OCCUPANCY_THRESHOLD_PCT,
            consumption_multiplier: OCCUPANCY_CONSUMPTION_MULTIPLIER,
            severity: SeverityTable::new(0.70, 0.85, 1.0, 1.2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayRule {
    pub threshold_multiplier: f64,
    pub severity: SeverityTable,
}

impl Default for HolidayRule {
    fn default() -> Self {
        Self {
            threshold_multiplier: HOLIDAY_MULTIPLIER,
            severity: SeverityTable::new(0.30, 0.45, 0.60, 0.80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationRule {
    pub threshold_multiplier: f64,
    pub severity: SeverityTable,
}

impl Default for VacationRule {
    fn default() -> Self {
        Self {
            threshold_multiplier: VACATION_MULTIPLIER,
            severity: SeverityTable::new(0.40, 0.55, 0.70, 0.85),
        }
    }
}

// ============================================================================
// RULE SET
// ============================================================================

/// Names for the individual rules, used to pick the real-time subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    OffHours,
    Weekend,
    Spike,
    Occupancy,
    Holiday,
    Vacation,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::OffHours,
        RuleKind::Weekend,
        RuleKind::Spike,
        RuleKind::Occupancy,
        RuleKind::Holiday,
        RuleKind::Vacation,
    ];
}

/// Full rule configuration injected into `RulesDetector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub off_hours: OffHoursRule,
    pub weekend: WeekendRule,
    pub spike: SpikeRule,
    pub occupancy: OccupancyRule,
    pub holiday: HolidayRule,
    pub vacation: VacationRule,

    /// Rules evaluated on the real-time single-record path. The vacation
    /// rule is excluded by default; making the divergence from batch mode
    /// explicit configuration instead of a hidden code path.
    pub realtime_rules: Vec<RuleKind>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            off_hours: OffHoursRule::default(),
            weekend: WeekendRule::default(),
            spike: SpikeRule::default(),
            occupancy: OccupancyRule::default(),
            holiday: HolidayRule::default(),
            vacation: VacationRule::default(),
            realtime_rules: vec![
                RuleKind::OffHours,
                RuleKind::Weekend,
                RuleKind::Spike,
                RuleKind::Occupancy,
                RuleKind::Holiday,
            ],
        }
    }
}

impl RuleSet {
    /// More alerts: every ceiling drops by a quarter.
    pub fn high_sensitivity() -> Self {
        let mut rules = Self::default();
        rules.off_hours.threshold_multiplier *= 0.75;
        rules.weekend.threshold_multiplier *= 0.75;
        rules.spike.z_score_threshold = 2.5;
        rules.occupancy.consumption_multiplier *= 0.75;
        rules.holiday.threshold_multiplier *= 0.75;
        rules.vacation.threshold_multiplier *= 0.75;
        rules
    }

    /// Fewer alerts: ceilings raised, spikes need a stronger signal.
    pub fn low_sensitivity() -> Self {
        let mut rules = Self::default();
        rules.off_hours.threshold_multiplier *= 1.25;
        rules.weekend.threshold_multiplier *= 1.25;
        rules.spike.z_score_threshold = 3.5;
        rules.occupancy.consumption_multiplier *= 1.25;
        rules.holiday.threshold_multiplier *= 1.25;
        rules.vacation.threshold_multiplier *= 1.25;
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_boundaries_are_inclusive() {
        let table = SeverityTable::new(0.35, 0.50, 0.75, 1.0);
        assert_eq!(table.severity_for(0.49), Severity::Low);
        assert_eq!(table.severity_for(0.50), Severity::Medium);
        assert_eq!(table.severity_for(0.75), Severity::High);
        assert_eq!(table.severity_for(1.0), Severity::Critical);
        assert_eq!(table.severity_for(5.0), Severity::Critical);
    }

    #[test]
    fn test_off_hours_window_wraps_midnight() {
        let rule = OffHoursRule::default();
        assert!(rule.contains_hour(22));
        assert!(rule.contains_hour(23));
        assert!(rule.contains_hour(0));
        assert!(rule.contains_hour(5));
        assert!(!rule.contains_hour(6));
        assert!(!rule.contains_hour(12));
    }

    #[test]
    fn test_default_realtime_subset_excludes_vacation() {
        let rules = RuleSet::default();
        assert!(!rules.realtime_rules.contains(&RuleKind::Vacation));
        assert_eq!(rules.realtime_rules.len(), 5);
    }
}
