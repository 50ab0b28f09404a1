//! Baseline Statistics
//!
//! Per-site historical aggregates used by every detector. A `Baseline` is a
//! read-only snapshot produced by an explicit `fit`; a new fit replaces it
//! wholesale, nothing ever patches one in place.
//!
//! ## Structure
//! - `stats`: descriptive-statistics helpers
//! - `types`: the `Baseline` snapshot
//! - `engine`: `fit_baselines` over a historical dataset
//! - `store`: site-keyed snapshot store with explicit refit

pub mod engine;
pub mod stats;
pub mod store;
pub mod types;

pub use engine::{fit_baselines, BaselineSet};
pub use store::BaselineStore;
pub use types::{Baseline, SectorStats};

#[cfg(test)]
mod tests;
