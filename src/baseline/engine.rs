//! Baseline fitting
//!
//! Partitions a historical dataset by site and computes the per-site
//! aggregates. Fitting is a first-class, explicit operation - detection
//! calls never trigger it implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::stats::{mean, mean_or, median, percentile, std_dev};
use super::types::{Baseline, SectorStats};
use crate::error::{DetectionError, DetectionResult};
use crate::record::{ConsumptionRecord, Sector};
use crate::site::Site;

/// Fitted baselines keyed by site.
pub type BaselineSet = HashMap<Site, Arc<Baseline>>;

// Fallback scales used when a site has no readings in a conditional bucket,
// e.g. a dataset with no weekend rows.
const NON_WORKING_FALLBACK_SCALE: f64 = 0.3;
const WEEKEND_FALLBACK_SCALE: f64 = 0.4;

/// Compute a `Baseline` for every site present in the dataset.
pub fn fit_baselines(records: &[ConsumptionRecord]) -> DetectionResult<BaselineSet> {
    if records.is_empty() {
        return Err(DetectionError::EmptyDataset);
    }

    let mut by_site: HashMap<Site, Vec<&ConsumptionRecord>> = HashMap::new();
    for record in records {
        by_site.entry(record.site.clone()).or_default().push(record);
    }

    let mut baselines = BaselineSet::new();
    for (site, site_records) in by_site {
        let baseline = fit_site(&site, &site_records)?;
        baselines.insert(site, Arc::new(baseline));
    }

    log::info!("Fitted baselines for {} sites", baselines.len());
    Ok(baselines)
}

fn fit_site(site: &Site, records: &[&ConsumptionRecord]) -> DetectionResult<Baseline> {
    let totals: Vec<f64> = records.iter().map(|r| r.total_kwh).collect();
    if totals.iter().any(|v| !v.is_finite()) {
        return Err(DetectionError::InvalidInput(format!(
            "non-finite total_kwh for site '{}'",
            site
        )));
    }

    let global_mean = mean(&totals);

    // Hour-of-day conditional stats
    let mut hourly_mean = [0.0f64; 24];
    let mut hourly_std = [0.0f64; 24];
    for hour in 0..24u32 {
        let bucket: Vec<f64> = records
            .iter()
            .filter(|r| r.hour() == hour)
            .map(|r| r.total_kwh)
            .collect();
        hourly_mean[hour as usize] = mean_or(&bucket, global_mean);
        hourly_std[hour as usize] = std_dev(&bucket);
    }

    // Day-of-week conditional means
    let mut daily_mean = [0.0f64; 7];
    for day in 0..7usize {
        let bucket: Vec<f64> = records
            .iter()
            .filter(|r| r.weekday_index() == day)
            .map(|r| r.total_kwh)
            .collect();
        daily_mean[day] = mean_or(&bucket, global_mean);
    }

    let working: Vec<f64> = records
        .iter()
        .filter(|r| r.is_working_hour())
        .map(|r| r.total_kwh)
        .collect();
    let non_working: Vec<f64> = records
        .iter()
        .filter(|r| !r.is_working_hour())
        .map(|r| r.total_kwh)
        .collect();
    let weekend: Vec<f64> = records
        .iter()
        .filter(|r| r.is_weekend_day())
        .map(|r| r.total_kwh)
        .collect();
    let weekday: Vec<f64> = records
        .iter()
        .filter(|r| !r.is_weekend_day())
        .map(|r| r.total_kwh)
        .collect();

    let mut sector_stats = std::collections::BTreeMap::new();
    for sector in Sector::ALL {
        let values: Vec<f64> = records.iter().map(|r| r.sectors.get(sector)).collect();
        sector_stats.insert(
            sector,
            SectorStats {
                mean: mean(&values),
                std: std_dev(&values),
            },
        );
    }

    Ok(Baseline {
        id: uuid::Uuid::new_v4(),
        site: site.clone(),
        mean: global_mean,
        std: std_dev(&totals),
        median: median(&totals),
        p95: percentile(&totals, 0.95),
        p99: percentile(&totals, 0.99),
        hourly_mean,
        hourly_std,
        daily_mean,
        working_hours_mean: mean_or(&working, global_mean),
        non_working_mean: mean_or(&non_working, global_mean * NON_WORKING_FALLBACK_SCALE),
        weekend_mean: mean_or(&weekend, global_mean * WEEKEND_FALLBACK_SCALE),
        weekday_mean: mean_or(&weekday, global_mean),
        sector_stats,
        sample_count: records.len(),
        fitted_at: Utc::now(),
    })
}
