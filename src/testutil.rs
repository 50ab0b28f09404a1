//! Shared helpers for unit tests: logging setup and synthetic
//! consumption datasets.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::{AcademicPeriod, CalendarFlags, ConsumptionRecord, SectorReadings};
use crate::site::{Site, SiteRegistry};

/// Route `log` output through env_logger so the detectors' info/warn
/// lines show up under `RUST_LOG`. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

pub fn site(name: &str) -> Site {
    SiteRegistry::new([name]).resolve(name).unwrap()
}

pub fn start_of_2024() -> DateTime<Utc> {
    // 2024-01-01 00:00 UTC, a Monday
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// A record with sane defaults; tests override what they care about.
pub fn record(site: &Site, ts: DateTime<Utc>, total_kwh: f64) -> ConsumptionRecord {
    ConsumptionRecord {
        timestamp: ts,
        site: site.clone(),
        sectors: SectorReadings {
            dining_kwh: total_kwh * 0.1,
            classrooms_kwh: total_kwh * 0.25,
            labs_kwh: total_kwh * 0.3,
            auditoriums_kwh: total_kwh * 0.1,
            offices_kwh: total_kwh * 0.25,
        },
        total_kwh,
        water_m3: 3.0,
        exterior_temp_c: 15.0,
        occupancy_pct: 60.0,
        flags: CalendarFlags {
            is_weekend: matches!(ts.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun),
            ..CalendarFlags::default()
        },
        period: AcademicPeriod::RegularTerm,
    }
}

/// Typical daily shape: low at night, high during working hours.
pub fn daily_profile(hour: u32) -> f64 {
    match hour {
        7..=18 => 1.0,
        19..=21 => 0.6,
        _ => 0.25,
    }
}

/// Hourly dataset for one site over `days` days following the daily
/// profile, with small deterministic noise.
pub fn hourly_dataset(site: &Site, days: usize, base_kwh: f64, seed: u64) -> Vec<ConsumptionRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = start_of_2024();
    let mut records = Vec::with_capacity(days * 24);

    for i in 0..days * 24 {
        let ts = start + Duration::hours(i as i64);
        let noise: f64 = rng.gen_range(-0.03..0.03);
        let total = base_kwh * daily_profile(ts.hour()) * (1.0 + noise);
        records.push(record(site, ts, total));
    }
    records
}
