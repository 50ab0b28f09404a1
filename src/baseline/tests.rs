use chrono::Duration;

use super::*;
use crate::error::DetectionError;
use crate::record::Sector;
use crate::testutil::{hourly_dataset, init_logging, record, site, start_of_2024};

#[test]
fn test_fit_empty_dataset_is_an_error() {
    assert_eq!(fit_baselines(&[]).unwrap_err(), DetectionError::EmptyDataset);
}

#[test]
fn test_fit_partitions_by_site() {
    let tunja = site("Tunja");
    let duitama = site("Duitama");
    let mut records = hourly_dataset(&tunja, 7, 100.0, 1);
    records.extend(hourly_dataset(&duitama, 7, 200.0, 2));

    let baselines = fit_baselines(&records).unwrap();
    assert_eq!(baselines.len(), 2);

    let b_tunja = &baselines[&tunja];
    let b_duitama = &baselines[&duitama];
    assert!(b_duitama.mean > b_tunja.mean);
    assert_eq!(b_tunja.sample_count, 7 * 24);
}

#[test]
fn test_working_vs_non_working_means() {
    let s = site("Tunja");
    let records = hourly_dataset(&s, 14, 100.0, 3);
    let baselines = fit_baselines(&records).unwrap();
    let b = &baselines[&s];

    // Profile keeps working hours around 100 and nights around 25.
    assert!(b.working_hours_mean > 90.0, "working mean {}", b.working_hours_mean);
    assert!(b.non_working_mean < 50.0, "non-working mean {}", b.non_working_mean);
    assert!(b.weekday_mean > 0.0 && b.weekend_mean > 0.0);
}

#[test]
fn test_zero_variance_site_has_no_z_score() {
    let s = site("Tunja");
    let start = start_of_2024();
    let records: Vec<_> = (0..48)
        .map(|i| record(&s, start + Duration::hours(i), 100.0))
        .collect();

    let baselines = fit_baselines(&records).unwrap();
    let b = &baselines[&s];
    assert_eq!(b.std, 0.0);
    assert!(b.z_score(10_000.0).is_none());
}

#[test]
fn test_hourly_mean_falls_back_to_global_for_missing_hours() {
    let s = site("Tunja");
    let start = start_of_2024();
    // Only readings at 10:00, every day
    let records: Vec<_> = (0..10)
        .map(|i| record(&s, start + Duration::days(i) + Duration::hours(10), 100.0))
        .collect();

    let baselines = fit_baselines(&records).unwrap();
    let b = &baselines[&s];
    assert_eq!(b.hourly_mean[3], b.mean);
    assert_eq!(b.hourly_std[3], 0.0);
    assert!((b.hourly_mean[10] - 100.0).abs() < 1e-9);
}

#[test]
fn test_sector_stats_present_for_all_sectors() {
    let s = site("Tunja");
    let records = hourly_dataset(&s, 7, 100.0, 4);
    let baselines = fit_baselines(&records).unwrap();
    let b = &baselines[&s];

    for sector in Sector::ALL {
        let stats = b.sector(sector).expect("sector stats missing");
        assert!(stats.mean > 0.0);
    }
}

#[test]
fn test_percentiles_are_ordered() {
    let s = site("Tunja");
    let records = hourly_dataset(&s, 14, 100.0, 5);
    let baselines = fit_baselines(&records).unwrap();
    let b = &baselines[&s];
    assert!(b.median <= b.p95);
    assert!(b.p95 <= b.p99);
}

#[test]
fn test_store_refit_replaces_wholesale() {
    init_logging();
    let tunja = site("Tunja");
    let duitama = site("Duitama");
    let store = BaselineStore::new();

    store.refit(&hourly_dataset(&tunja, 7, 100.0, 6)).unwrap();
    assert!(store.get(&tunja).is_some());

    // Refit with a different site only: the old snapshot must be gone.
    store.refit(&hourly_dataset(&duitama, 7, 100.0, 7)).unwrap();
    assert!(store.get(&tunja).is_none());
    assert!(store.get(&duitama).is_some());
}

#[test]
fn test_store_snapshot_survives_refit() {
    let tunja = site("Tunja");
    let store = BaselineStore::new();
    store.refit(&hourly_dataset(&tunja, 7, 100.0, 8)).unwrap();

    let held = store.get(&tunja).unwrap();
    let id_before = held.id;

    store.refit(&hourly_dataset(&tunja, 7, 300.0, 9)).unwrap();
    // Reader still sees the snapshot it took before the refit.
    assert_eq!(held.id, id_before);
    assert_ne!(store.get(&tunja).unwrap().id, id_before);
}
