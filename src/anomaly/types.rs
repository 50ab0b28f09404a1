//! Anomaly data structures
//!
//! Data only - no detection logic. Severity and anomaly type are closed
//! enums so the merger and comparators can match exhaustively.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Sector;
use crate::site::Site;

// ============================================================================
// SEVERITY
// ============================================================================

/// Ordinal severity tiers: Low < Medium < High < Critical.
///
/// Never set directly by callers - always derived from a deviation ratio
/// or z-score through a rule's severity table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ANOMALY TYPE
// ============================================================================

/// Closed enumeration of everything the ensemble can flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    OffHoursUsage,
    WeekendAnomaly,
    ConsumptionSpike,
    OccupancyImbalance,
    HolidayConsumption,
    VacationHigh,
    ResidualSpike,
    ResidualDrop,
    StatisticalOutlier,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::OffHoursUsage => "off_hours_usage",
            AnomalyType::WeekendAnomaly => "weekend_anomaly",
            AnomalyType::ConsumptionSpike => "consumption_spike",
            AnomalyType::OccupancyImbalance => "occupancy_imbalance",
            AnomalyType::HolidayConsumption => "holiday_consumption",
            AnomalyType::VacationHigh => "vacation_high",
            AnomalyType::ResidualSpike => "residual_spike",
            AnomalyType::ResidualDrop => "residual_drop",
            AnomalyType::StatisticalOutlier => "statistical_outlier",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DETECTOR KIND
// ============================================================================

/// Identifies which detection method produced a candidate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Rules,
    Residual,
    OutlierModel,
    /// Single-record rules path; never enters the consensus merger.
    RulesRealtime,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Rules => "rules",
            DetectorKind::Residual => "residual",
            DetectorKind::OutlierModel => "outlier_model",
            DetectorKind::RulesRealtime => "rules_realtime",
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// One anomaly flagged by a single detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyCandidate {
    pub timestamp: DateTime<Utc>,
    pub site: Site,
    /// `None` means the whole-site total.
    pub sector: Option<Sector>,
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub actual_value: f64,
    pub expected_value: f64,
    pub deviation_pct: f64,
    pub z_score: Option<f64>,
    pub description: String,
    pub recommendation: String,
    /// Always >= 0; clamped at construction.
    pub potential_savings_kwh: f64,
    pub detected_by: DetectorKind,
}

impl AnomalyCandidate {
    /// Savings estimate, clamped at zero when actual < expected.
    pub fn savings(actual: f64, expected: f64) -> f64 {
        (actual - expected).max(0.0)
    }
}

// ============================================================================
// MERGED ANOMALY
// ============================================================================

/// Consensus result emitted by the ensemble merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedAnomaly {
    pub timestamp: DateTime<Utc>,
    pub site: Site,
    pub sector: Option<Sector>,
    /// All anomaly types reported by the contributing candidates.
    pub anomaly_types: BTreeSet<AnomalyType>,
    /// Max severity over the contributing candidates.
    pub severity: Severity,
    pub actual_value: f64,
    pub expected_value: f64,
    pub deviation_pct: f64,
    pub description: String,
    pub recommendation: String,
    pub potential_savings_kwh: f64,
    /// Number of distinct detectors that flagged this (site, hour) bucket.
    pub consensus: usize,
    pub detected_by: BTreeSet<DetectorKind>,
    /// Weighted sum of per-detector weights for contributors.
    pub ensemble_score: f64,
}
