//! Residual (Seasonal-Trend) Detector
//!
//! Decomposes each site's total-energy series into trend, seasonal, and
//! residual components and flags residual outliers. This capability is
//! optional in a deployment; the ensemble keeps working without it.
//!
//! ## Structure
//! - `decompose`: classical seasonal-trend decomposition
//! - `detector`: residual z-score detection, trend acceleration, seasonal profile

pub mod decompose;
pub mod detector;

pub use decompose::{decompose, Decomposition};
pub use detector::{
    ResidualDetector, SeasonalPattern, TrendChange, TrendDirection, DEFAULT_SEASONAL_PERIOD,
};
