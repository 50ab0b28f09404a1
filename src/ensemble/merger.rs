//! Consensus merger
//!
//! Groups candidates from independent detectors into (site, hour) buckets
//! and reports a bucket when enough distinct detectors agree. Pure function
//! of its inputs; all tuning comes through `EnsembleConfig`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::config::EnsembleConfig;
use crate::anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, MergedAnomaly, Severity};
use crate::site::Site;

/// Truncate a timestamp down to the start of its hour.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(3600), 0).unwrap_or(ts)
}

/// Merge per-detector candidate lists into consensus anomalies.
///
/// Buckets with at least `min_consensus` distinct detectors merge into one
/// `MergedAnomaly` stamped at the bucket hour. With `min_consensus <= 1`,
/// single-detector candidates pass through individually and keep their
/// original timestamps. Output is sorted by timestamp ascending, then
/// severity descending.
pub fn merge(
    candidates: &HashMap<DetectorKind, Vec<AnomalyCandidate>>,
    config: &EnsembleConfig,
) -> Vec<MergedAnomaly> {
    // BTreeMap keeps bucket iteration deterministic.
    let mut buckets: BTreeMap<(Site, DateTime<Utc>), Vec<&AnomalyCandidate>> = BTreeMap::new();

    let mut kinds: Vec<&DetectorKind> = candidates.keys().collect();
    kinds.sort();
    for kind in kinds {
        for candidate in &candidates[kind] {
            if let Some(min) = config.min_severity {
                if candidate.severity < min {
                    continue;
                }
            }
            let key = (candidate.site.clone(), truncate_to_hour(candidate.timestamp));
            buckets.entry(key).or_default().push(candidate);
        }
    }

    let mut merged = Vec::new();
    for ((site, hour), members) in buckets {
        let detected_by: BTreeSet<DetectorKind> =
            members.iter().map(|c| c.detected_by).collect();
        let consensus = detected_by.len();

        if consensus >= config.min_consensus && consensus >= 2 {
            merged.push(merge_bucket(site, hour, &members, detected_by, config));
        } else if config.min_consensus <= 1 {
            for candidate in members {
                merged.push(singleton(candidate, config));
            }
        }
        // consensus 1 with min_consensus >= 2: suppressed.
    }

    merged.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| b.severity.cmp(&a.severity))
    });

    log::info!("Merger produced {} anomalies from {} detectors", merged.len(), candidates.len());
    merged
}

fn merge_bucket(
    site: Site,
    hour: DateTime<Utc>,
    members: &[&AnomalyCandidate],
    detected_by: BTreeSet<DetectorKind>,
    config: &EnsembleConfig,
) -> MergedAnomaly {
    let n = members.len() as f64;
    let anomaly_types: BTreeSet<AnomalyType> =
        members.iter().map(|c| c.anomaly_type).collect();
    let severity = members
        .iter()
        .map(|c| c.severity)
        .max()
        .unwrap_or(Severity::Low);

    let sector = members
        .iter()
        .all(|c| c.sector == members[0].sector)
        .then(|| members[0].sector)
        .flatten();

    // Deterministic representative for the recommendation text.
    let mut ordered: Vec<&&AnomalyCandidate> = members.iter().collect();
    ordered.sort_by_key(|c| (c.detected_by, c.timestamp));

    let type_list = anomaly_types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let ensemble_score: f64 = detected_by
        .iter()
        .map(|kind| config.weights.weight_for(*kind))
        .sum();

    MergedAnomaly {
        timestamp: hour,
        site,
        sector,
        anomaly_types,
        severity,
        actual_value: members.iter().map(|c| c.actual_value).sum::<f64>() / n,
        expected_value: members.iter().map(|c| c.expected_value).sum::<f64>() / n,
        deviation_pct: members.iter().map(|c| c.deviation_pct).sum::<f64>() / n,
        description: format!(
            "Anomaly confirmed by {} methods: {}",
            detected_by.len(),
            type_list
        ),
        recommendation: ordered[0].recommendation.clone(),
        potential_savings_kwh: members.iter().map(|c| c.potential_savings_kwh).sum::<f64>() / n,
        consensus: detected_by.len(),
        detected_by,
        ensemble_score,
    }
}

fn singleton(candidate: &AnomalyCandidate, config: &EnsembleConfig) -> MergedAnomaly {
    MergedAnomaly {
        timestamp: candidate.timestamp,
        site: candidate.site.clone(),
        sector: candidate.sector,
        anomaly_types: BTreeSet::from([candidate.anomaly_type]),
        severity: candidate.severity,
        actual_value: candidate.actual_value,
        expected_value: candidate.expected_value,
        deviation_pct: candidate.deviation_pct,
        description: candidate.description.clone(),
        recommendation: candidate.recommendation.clone(),
        potential_savings_kwh: candidate.potential_savings_kwh,
        consensus: 1,
        detected_by: BTreeSet::from([candidate.detected_by]),
        ensemble_score: config.weights.weight_for(candidate.detected_by),
    }
}
