//! Baseline snapshot types
//!
//! Data only. A `Baseline` is immutable after `fit`; detectors hold it
//! behind an `Arc` and never write through it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Sector;
use crate::site::Site;

/// Mean/std pair for one sector of a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorStats {
    pub mean: f64,
    pub std: f64,
}

/// Historical statistics for one site, computed over at least one
/// representative period (ideally several weeks) of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub id: uuid::Uuid,
    pub site: Site,

    // Global descriptive statistics of total kWh
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,

    // Conditional means
    pub hourly_mean: [f64; 24],
    pub hourly_std: [f64; 24],
    /// Monday = index 0 .. Sunday = index 6.
    pub daily_mean: [f64; 7],
    /// 07:00-18:00 inclusive.
    pub working_hours_mean: f64,
    pub non_working_mean: f64,
    pub weekend_mean: f64,
    pub weekday_mean: f64,

    pub sector_stats: BTreeMap<Sector, SectorStats>,

    // Metadata
    pub sample_count: usize,
    pub fitted_at: DateTime<Utc>,
}

impl Baseline {
    /// Z-score of a total-kWh value against the global distribution.
    /// `None` when the site has zero variance - spike rules must treat
    /// this as "no spike detectable", never divide by zero.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std > 0.0 {
            Some((value - self.mean) / self.std)
        } else {
            None
        }
    }

    pub fn sector(&self, sector: Sector) -> Option<&SectorStats> {
        self.sector_stats.get(&sector)
    }
}
