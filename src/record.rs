//! Consumption Records
//!
//! Input schema of the detection core: one reading per site per hour.
//! Records are immutable once constructed; the core only classifies them.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::site::Site;

// ============================================================================
// SECTORS
// ============================================================================

/// Named consumption zones within a site. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Dining,
    Classrooms,
    Labs,
    Auditoriums,
    Offices,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Dining,
        Sector::Classrooms,
        Sector::Labs,
        Sector::Auditoriums,
        Sector::Offices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Dining => "dining",
            Sector::Classrooms => "classrooms",
            Sector::Labs => "labs",
            Sector::Auditoriums => "auditoriums",
            Sector::Offices => "offices",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-sector energy readings (kWh).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorReadings {
    pub dining_kwh: f64,
    pub classrooms_kwh: f64,
    pub labs_kwh: f64,
    pub auditoriums_kwh: f64,
    pub offices_kwh: f64,
}

impl SectorReadings {
    pub fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Dining => self.dining_kwh,
            Sector::Classrooms => self.classrooms_kwh,
            Sector::Labs => self.labs_kwh,
            Sector::Auditoriums => self.auditoriums_kwh,
            Sector::Offices => self.offices_kwh,
        }
    }

    pub fn sum(&self) -> f64 {
        Sector::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

// ============================================================================
// CALENDAR CONTEXT
// ============================================================================

/// Label for the academic calendar period a reading falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicPeriod {
    RegularTerm,
    MidtermWeek,
    FinalsWeek,
    MidYearBreak,
    EndOfYearBreak,
}

impl AcademicPeriod {
    /// Vacation periods: campuses should be near-empty.
    pub fn is_vacation(&self) -> bool {
        matches!(self, AcademicPeriod::MidYearBreak | AcademicPeriod::EndOfYearBreak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicPeriod::RegularTerm => "regular_term",
            AcademicPeriod::MidtermWeek => "midterm_week",
            AcademicPeriod::FinalsWeek => "finals_week",
            AcademicPeriod::MidYearBreak => "mid_year_break",
            AcademicPeriod::EndOfYearBreak => "end_of_year_break",
        }
    }
}

/// Calendar flags attached to a reading by the ingestion layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFlags {
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub is_midterm_week: bool,
    pub is_finals_week: bool,
}

// ============================================================================
// CONSUMPTION RECORD
// ============================================================================

/// One consumption reading for a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub timestamp: DateTime<Utc>,
    pub site: Site,
    pub sectors: SectorReadings,
    pub total_kwh: f64,
    pub water_m3: f64,
    pub exterior_temp_c: f64,
    /// Reported occupancy, 0-100.
    pub occupancy_pct: f64,
    pub flags: CalendarFlags,
    pub period: AcademicPeriod,
}

impl ConsumptionRecord {
    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Day of week, Monday = 0 .. Sunday = 6.
    pub fn weekday_index(&self) -> usize {
        self.timestamp.weekday().num_days_from_monday() as usize
    }

    pub fn is_weekend_day(&self) -> bool {
        matches!(self.timestamp.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Working hours are 07:00-18:00 inclusive.
    pub fn is_working_hour(&self) -> bool {
        (7..=18).contains(&self.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::DEFAULT_CAMPUSES;
    use chrono::TimeZone;

    fn record_at(ts: DateTime<Utc>) -> ConsumptionRecord {
        ConsumptionRecord {
            timestamp: ts,
            site: DEFAULT_CAMPUSES.resolve("Tunja").unwrap(),
            sectors: SectorReadings::default(),
            total_kwh: 100.0,
            water_m3: 3.0,
            exterior_temp_c: 15.0,
            occupancy_pct: 50.0,
            flags: CalendarFlags::default(),
            period: AcademicPeriod::RegularTerm,
        }
    }

    #[test]
    fn test_weekday_index() {
        // 2024-01-01 was a Monday
        let rec = record_at(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(rec.weekday_index(), 0);
        assert!(!rec.is_weekend_day());

        let rec = record_at(Utc.with_ymd_and_hms(2024, 1, 6, 10, 0, 0).unwrap());
        assert!(rec.is_weekend_day());
    }

    #[test]
    fn test_working_hours_boundaries() {
        assert!(record_at(Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()).is_working_hour());
        assert!(record_at(Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()).is_working_hour());
        assert!(!record_at(Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap()).is_working_hour());
        assert!(!record_at(Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap()).is_working_hour());
    }

    #[test]
    fn test_sector_readings_sum() {
        let readings = SectorReadings {
            dining_kwh: 1.0,
            classrooms_kwh: 2.0,
            labs_kwh: 3.0,
            auditoriums_kwh: 4.0,
            offices_kwh: 5.0,
        };
        assert_eq!(readings.sum(), 15.0);
        assert_eq!(readings.get(Sector::Labs), 3.0);
    }
}
