//! Ensemble configuration
//!
//! Injected into the merger and the top-level detector; nothing here is
//! a process-wide global. Weights and the consensus floor are tunable per
//! deployment.

use serde::{Deserialize, Serialize};

use crate::anomaly::{DetectorKind, Severity};

pub const DEFAULT_MIN_CONSENSUS: usize = 2;

pub const WEIGHT_RULES: f64 = 0.4;
pub const WEIGHT_RESIDUAL: f64 = 0.3;
pub const WEIGHT_OUTLIER_MODEL: f64 = 0.3;

/// Per-detector contribution to the ensemble score. Each detector counts
/// once per merged anomaly no matter how many candidates it contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorWeights {
    pub rules: f64,
    pub residual: f64,
    pub outlier_model: f64,
}

impl Default for DetectorWeights {
    fn default() -> Self {
        Self {
            rules: WEIGHT_RULES,
            residual: WEIGHT_RESIDUAL,
            outlier_model: WEIGHT_OUTLIER_MODEL,
        }
    }
}

impl DetectorWeights {
    pub fn weight_for(&self, kind: DetectorKind) -> f64 {
        match kind {
            DetectorKind::Rules | DetectorKind::RulesRealtime => self.rules,
            DetectorKind::Residual => self.residual,
            DetectorKind::OutlierModel => self.outlier_model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Distinct detectors required before a bucket is reported.
    pub min_consensus: usize,
    pub weights: DetectorWeights,
    /// Candidates below this tier are dropped before merging.
    pub min_severity: Option<Severity>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            min_consensus: DEFAULT_MIN_CONSENSUS,
            weights: DetectorWeights::default(),
            min_severity: None,
        }
    }
}

impl EnsembleConfig {
    /// Report every finding, including ones a single method flagged.
    pub fn single_method() -> Self {
        Self { min_consensus: 1, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = DetectorWeights::default();
        assert!((w.rules + w.residual + w.outlier_model - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_realtime_rules_share_the_rules_weight() {
        let w = DetectorWeights::default();
        assert_eq!(w.weight_for(DetectorKind::Rules), w.weight_for(DetectorKind::RulesRealtime));
    }
}
