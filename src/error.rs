//! Error handling
//!
//! Detector-level failures are caught locally and degrade to empty results.
//! Only errors that make the input itself unusable (empty dataset, detection
//! requested before any baseline was fitted) surface through this type.

use crate::site::Site;

pub type DetectionResult<T> = Result<T, DetectionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Fit was requested on a dataset with no records.
    EmptyDataset,

    /// Detection requested before any `fit` call.
    NotFitted,

    /// No fitted baseline exists for this site.
    NoBaseline(Site),

    /// Site name not present in the registry.
    UnknownSite(String),

    /// The pretrained outlier model is absent or failed to load.
    ModelUnavailable(String),

    /// Malformed input (non-finite values, inconsistent lengths, ...).
    InvalidInput(String),
}

impl std::fmt::Display for DetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionError::EmptyDataset => write!(f, "Dataset contains no records"),
            DetectionError::NotFitted => write!(f, "No baselines fitted; call fit() first"),
            DetectionError::NoBaseline(site) => write!(f, "No fitted baseline for site '{}'", site),
            DetectionError::UnknownSite(name) => write!(f, "Unknown site '{}'", name),
            DetectionError::ModelUnavailable(msg) => write!(f, "Outlier model unavailable: {}", msg),
            DetectionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for DetectionError {}
