//! Model output to candidate schema
//!
//! Maps the model's continuous score magnitude to a severity tier through
//! configurable cutoffs and emits `statistical_outlier` candidates. A
//! missing or failing model contributes an empty list, never an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::features::feature_matrix;
use super::OutlierModel;
use crate::anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, Severity};
use crate::baseline::stats::mean;
use crate::record::ConsumptionRecord;

// Default cutoffs over |score|, from the reference calibration.
pub const SCORE_CUTOFF_CRITICAL: f64 = 0.3;
pub const SCORE_CUTOFF_HIGH: f64 = 0.2;
pub const SCORE_CUTOFF_MEDIUM: f64 = 0.1;

/// Severity cutoffs over the score magnitude. Tunable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCutoffs {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for ScoreCutoffs {
    fn default() -> Self {
        Self {
            critical: SCORE_CUTOFF_CRITICAL,
            high: SCORE_CUTOFF_HIGH,
            medium: SCORE_CUTOFF_MEDIUM,
        }
    }
}

impl ScoreCutoffs {
    pub fn severity_for(&self, score_magnitude: f64) -> Severity {
        if score_magnitude >= self.critical {
            Severity::Critical
        } else if score_magnitude >= self.high {
            Severity::High
        } else if score_magnitude >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Clone, Default)]
pub struct OutlierDetector {
    model: Option<Arc<dyn OutlierModel>>,
    cutoffs: ScoreCutoffs,
}

impl OutlierDetector {
    pub fn new(model: Arc<dyn OutlierModel>) -> Self {
        Self { model: Some(model), cutoffs: ScoreCutoffs::default() }
    }

    /// Adapter with no model: contributes nothing to the ensemble.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn with_cutoffs(mut self, cutoffs: ScoreCutoffs) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    /// Capability check for the ensemble's detector registry.
    pub fn available(&self) -> bool {
        self.model.as_ref().map(|m| m.is_loaded()).unwrap_or(false)
    }

    pub fn detect(&self, records: &[ConsumptionRecord]) -> Vec<AnomalyCandidate> {
        let model = match &self.model {
            Some(m) if m.is_loaded() => m,
            _ => {
                log::info!("Outlier model not loaded, contributing no candidates");
                return Vec::new();
            }
        };
        if records.is_empty() {
            return Vec::new();
        }

        let features = feature_matrix(records);
        let (flags, scores) = match (model.predict(&features), model.decision_scores(&features)) {
            (Ok(flags), Ok(scores)) => (flags, scores),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Outlier model '{}' failed: {}", model.name(), e);
                return Vec::new();
            }
        };
        if flags.len() != records.len() || scores.len() != records.len() {
            log::warn!(
                "Outlier model '{}' returned {} predictions for {} records",
                model.name(),
                flags.len(),
                records.len()
            );
            return Vec::new();
        }

        // Expected value is the dataset-wide mean, same reference point the
        // model was trained against.
        let dataset_mean = mean(&records.iter().map(|r| r.total_kwh).collect::<Vec<_>>());

        let mut candidates = Vec::new();
        for (i, record) in records.iter().enumerate() {
            if !flags[i] {
                continue;
            }
            let score = scores[i];
            let actual = record.total_kwh;
            let deviation_pct = if dataset_mean != 0.0 {
                (actual - dataset_mean) / dataset_mean * 100.0
            } else {
                0.0
            };

            candidates.push(AnomalyCandidate {
                timestamp: record.timestamp,
                site: record.site.clone(),
                sector: None,
                anomaly_type: AnomalyType::StatisticalOutlier,
                severity: self.cutoffs.severity_for(score.abs()),
                actual_value: actual,
                expected_value: dataset_mean,
                deviation_pct,
                z_score: None,
                description: format!(
                    "Statistical outlier flagged by {} (score {:.3})",
                    model.name(),
                    score
                ),
                recommendation: "Investigate the unusual consumption pattern.".to_string(),
                potential_savings_kwh: AnomalyCandidate::savings(actual, dataset_mean),
                detected_by: DetectorKind::OutlierModel,
            });
        }

        log::info!("Outlier model flagged {} candidates", candidates.len());
        candidates
    }
}
