//! Consensus ensemble
//!
//! Combines the rule-based, residual, and outlier-model detectors into a
//! single pipeline with a cross-validation step: independent detectors vote,
//! and only buckets with enough distinct votes are reported (unless the
//! consensus floor is lowered to one).
//!
//! ## Structure
//! - `config`: detector weights and the consensus floor
//! - `merger`: (site, hour) bucketing and consensus merge
//! - `detector`: top-level fit/detect entry point and summaries

pub mod config;
pub mod detector;
pub mod merger;

pub use config::{DetectorWeights, EnsembleConfig};
pub use detector::{summarize, AnomalySummary, EnsembleDetector};
pub use merger::{merge, truncate_to_hour};
