//! Ensemble detector
//!
//! Top-level entry point. Owns the baseline store and the three detection
//! methods, runs them over a dataset, and hands their candidates to the
//! consensus merger. Fitting is explicit: `detect` on an unfitted ensemble
//! is an error, never a silent implicit fit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::EnsembleConfig;
use super::merger::merge;
use crate::anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, MergedAnomaly, Severity};
use crate::baseline::BaselineStore;
use crate::error::{DetectionError, DetectionResult};
use crate::outlier::{OutlierDetector, OutlierModel};
use crate::record::ConsumptionRecord;
use crate::residual::ResidualDetector;
use crate::rules::{RuleSet, RulesDetector};
use crate::site::Site;

pub struct EnsembleDetector {
    rules: RulesDetector,
    residual: Option<ResidualDetector>,
    outlier: OutlierDetector,
    store: BaselineStore,
    config: EnsembleConfig,
}

impl Default for EnsembleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnsembleDetector {
    /// Default ensemble: all rules, residual decomposition, no outlier
    /// model loaded.
    pub fn new() -> Self {
        Self {
            rules: RulesDetector::new(RuleSet::default()),
            residual: Some(ResidualDetector::default()),
            outlier: OutlierDetector::unloaded(),
            store: BaselineStore::new(),
            config: EnsembleConfig::default(),
        }
    }

    pub fn with_model(mut self, model: Arc<dyn OutlierModel>) -> Self {
        self.outlier = OutlierDetector::new(model);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = RulesDetector::new(rules);
        self
    }

    pub fn with_residual(mut self, residual: ResidualDetector) -> Self {
        self.residual = Some(residual);
        self
    }

    pub fn without_residual(mut self) -> Self {
        self.residual = None;
        self
    }

    pub fn with_config(mut self, config: EnsembleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn baselines(&self) -> &BaselineStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // CAPABILITY REGISTRY
    // ------------------------------------------------------------------

    /// Detectors that would actually run right now. Callers inspect this
    /// instead of probing optional components themselves.
    pub fn active_detectors(&self) -> Vec<DetectorKind> {
        let mut active = Vec::new();
        if self.rules.available() {
            active.push(DetectorKind::Rules);
        }
        if self.residual.as_ref().map(|r| r.available()).unwrap_or(false) {
            active.push(DetectorKind::Residual);
        }
        if self.outlier.available() {
            active.push(DetectorKind::OutlierModel);
        }
        active
    }

    // ------------------------------------------------------------------
    // FIT / DETECT
    // ------------------------------------------------------------------

    /// Fit per-site baselines from a historical dataset, replacing any
    /// previous fit wholesale.
    pub fn fit(&self, records: &[ConsumptionRecord]) -> DetectionResult<usize> {
        let count = self.store.refit(records)?;
        log::info!("Ensemble fitted baselines for {} sites", count);
        Ok(count)
    }

    pub fn is_fitted(&self) -> bool {
        self.store.is_fitted()
    }

    /// Run every active detector over the dataset and merge the results.
    pub fn detect(
        &self,
        records: &[ConsumptionRecord],
    ) -> DetectionResult<Vec<MergedAnomaly>> {
        if !self.store.is_fitted() {
            return Err(DetectionError::NotFitted);
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let baselines = self.store.snapshot();
        let mut candidates: HashMap<DetectorKind, Vec<AnomalyCandidate>> = HashMap::new();

        candidates.insert(
            DetectorKind::Rules,
            self.rules.detect(&baselines, records, self.config.min_severity),
        );

        if let Some(residual) = &self.residual {
            if residual.available() {
                candidates.insert(
                    DetectorKind::Residual,
                    residual.detect(records, self.config.min_severity),
                );
            }
        }

        if self.outlier.available() {
            let mut found = self.outlier.detect(records);
            if let Some(min) = self.config.min_severity {
                found.retain(|c| c.severity >= min);
            }
            candidates.insert(DetectorKind::OutlierModel, found);
        }

        Ok(merge(&candidates, &self.config))
    }

    // ------------------------------------------------------------------
    // REAL-TIME SINGLE-RECORD PATH
    // ------------------------------------------------------------------

    /// Evaluate one incoming record against the fitted baseline for its
    /// site. Rules only; no decomposition, no model inference. A missing
    /// baseline yields an empty list, not an error.
    pub fn detect_realtime(&self, record: &ConsumptionRecord) -> Vec<AnomalyCandidate> {
        let baseline = match self.store.get(&record.site) {
            Some(b) => b,
            None => {
                log::warn!(
                    "No baseline for site '{}', real-time check skipped",
                    record.site
                );
                return Vec::new();
            }
        };

        let mut found = self.rules.detect_record(&baseline, record);
        if let Some(min) = self.config.min_severity {
            found.retain(|c| c.severity >= min);
        }
        found
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Aggregate view of a merged detection run, for reports and dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_type: BTreeMap<AnomalyType, usize>,
    pub by_site: BTreeMap<Site, usize>,
    pub total_potential_savings_kwh: f64,
    pub avg_deviation_pct: f64,
}

pub fn summarize(anomalies: &[MergedAnomaly]) -> AnomalySummary {
    let mut by_severity = BTreeMap::new();
    let mut by_type = BTreeMap::new();
    let mut by_site = BTreeMap::new();
    let mut savings = 0.0;
    let mut deviation = 0.0;

    for anomaly in anomalies {
        *by_severity.entry(anomaly.severity).or_insert(0) += 1;
        for anomaly_type in &anomaly.anomaly_types {
            *by_type.entry(*anomaly_type).or_insert(0) += 1;
        }
        *by_site.entry(anomaly.site.clone()).or_insert(0) += 1;
        savings += anomaly.potential_savings_kwh;
        deviation += anomaly.deviation_pct.abs();
    }

    AnomalySummary {
        total: anomalies.len(),
        by_severity,
        by_type,
        by_site,
        total_potential_savings_kwh: savings,
        avg_deviation_pct: if anomalies.is_empty() {
            0.0
        } else {
            deviation / anomalies.len() as f64
        },
    }
}
