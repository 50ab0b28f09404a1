//! Campus Energy Monitor - Anomaly Detection Core
//!
//! Multi-method anomaly detection over campus electricity and water
//! consumption. Three independent methods run over the same dataset and a
//! consensus merger cross-validates their findings:
//!
//! - `rules`: threshold rules against fitted per-site baselines
//! - `residual`: seasonal-trend decomposition and residual z-scores
//! - `outlier`: adapter over a pretrained unsupervised outlier model
//!
//! `ensemble::EnsembleDetector` is the entry point. Fit it on history,
//! then run batch detection or the single-record real-time path:
//!
//! ```no_run
//! use campus_energy_core::ensemble::EnsembleDetector;
//!
//! # fn run(history: Vec<campus_energy_core::record::ConsumptionRecord>) {
//! let ensemble = EnsembleDetector::new();
//! ensemble.fit(&history).unwrap();
//! let anomalies = ensemble.detect(&history).unwrap();
//! # }
//! ```

pub mod anomaly;
pub mod baseline;
pub mod ensemble;
pub mod error;
pub mod outlier;
pub mod record;
pub mod residual;
pub mod rules;
pub mod site;

#[cfg(test)]
mod testutil;

pub use anomaly::{AnomalyCandidate, AnomalyType, DetectorKind, MergedAnomaly, Severity};
pub use ensemble::{EnsembleConfig, EnsembleDetector};
pub use error::{DetectionError, DetectionResult};
pub use record::ConsumptionRecord;
pub use site::{Site, SiteRegistry};
