//! Outlier-Model Adapter
//!
//! Wraps an externally-trained unsupervised outlier scorer. This module is
//! a pure translation layer: select numeric features, invoke the model, map
//! scores to the candidate schema. Training and feature engineering live
//! outside the core; an absent model degrades to an empty candidate list.
//!
//! ## Structure
//! - `features`: numeric feature matrix from consumption records
//! - `adapter`: score-to-candidate mapping, severity cutoffs
//! - `onnx`: `OutlierModel` implementation over an ONNX session

pub mod adapter;
pub mod features;
pub mod onnx;

pub use adapter::{OutlierDetector, ScoreCutoffs};
pub use features::{feature_matrix, FEATURE_COUNT};
pub use onnx::OnnxOutlierModel;

use ndarray::Array2;

// ============================================================================
// MODEL CONTRACT
// ============================================================================

#[derive(Debug)]
pub struct ModelError(pub String);

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModelError: {}", self.0)
    }
}

impl std::error::Error for ModelError {}

/// Pretrained unsupervised outlier scorer, loaded and owned by the host
/// service and passed in by reference.
///
/// Follows the isolation-forest convention: `decision_scores` are negative
/// for outliers, and `predict` is the binarized form of the same signal.
pub trait OutlierModel: Send + Sync {
    /// Continuous anomaly score per row of the feature matrix.
    fn decision_scores(&self, features: &Array2<f64>) -> Result<Vec<f64>, ModelError>;

    /// Binary outlier flag per row. Default: score below zero.
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<bool>, ModelError> {
        Ok(self.decision_scores(features)?.iter().map(|s| *s < 0.0).collect())
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}
