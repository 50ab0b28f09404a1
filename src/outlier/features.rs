//! Feature matrix construction
//!
//! Numeric columns only: calendar encodings, per-sector energy, water,
//! temperature, occupancy. The total-kWh target and the site identifier are
//! deliberately excluded - the model scores behavior, not identity.

use ndarray::Array2;

use crate::record::{ConsumptionRecord, Sector};

pub const FEATURE_COUNT: usize = 13;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "hour",
    "day_of_week",
    "dining_kwh",
    "classrooms_kwh",
    "labs_kwh",
    "auditoriums_kwh",
    "offices_kwh",
    "water_m3",
    "exterior_temp_c",
    "occupancy_pct",
    "is_weekend",
    "is_holiday",
    "is_vacation",
];

/// One row per record, `FEATURE_COUNT` columns.
pub fn feature_matrix(records: &[ConsumptionRecord]) -> Array2<f64> {
    let mut matrix = Array2::zeros((records.len(), FEATURE_COUNT));

    for (i, record) in records.iter().enumerate() {
        let mut row = matrix.row_mut(i);
        row[0] = record.hour() as f64;
        row[1] = record.weekday_index() as f64;
        row[2] = record.sectors.get(Sector::Dining);
        row[3] = record.sectors.get(Sector::Classrooms);
        row[4] = record.sectors.get(Sector::Labs);
        row[5] = record.sectors.get(Sector::Auditoriums);
        row[6] = record.sectors.get(Sector::Offices);
        row[7] = record.water_m3;
        row[8] = record.exterior_temp_c;
        row[9] = record.occupancy_pct;
        row[10] = record.flags.is_weekend as u8 as f64;
        row[11] = record.flags.is_holiday as u8 as f64;
        row[12] = record.period.is_vacation() as u8 as f64;
    }

    matrix
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::testutil::{record, site};

    #[test]
    fn test_matrix_shape_and_encoding() {
        let s = site("Tunja");
        let ts = Utc.with_ymd_and_hms(2024, 1, 6, 14, 0, 0).unwrap(); // Saturday
        let rec = record(&s, ts, 100.0);

        let matrix = feature_matrix(&[rec]);
        assert_eq!(matrix.shape(), &[1, FEATURE_COUNT]);
        assert_eq!(matrix[[0, 0]], 14.0); // hour
        assert_eq!(matrix[[0, 1]], 5.0); // Saturday index
        assert_eq!(matrix[[0, 10]], 1.0); // weekend flag
    }

    #[test]
    fn test_empty_input() {
        let matrix = feature_matrix(&[]);
        assert_eq!(matrix.shape(), &[0, FEATURE_COUNT]);
    }
}
