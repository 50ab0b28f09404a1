//! Anomaly Types
//!
//! Core output types of the detection pipeline. No logic here - the
//! detectors own the logic, this module owns the data shapes.
//!
//! ## Structure
//! - `types`: Severity, AnomalyType, DetectorKind, candidate/merged records

pub mod types;

pub use types::{
    AnomalyCandidate, AnomalyType, DetectorKind, MergedAnomaly, Severity,
};
