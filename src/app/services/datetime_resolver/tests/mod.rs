//! Tests for the date/time resolver module

pub mod resolver_tests;

use super::{DateFormat, DateTimeResolver, ReferenceTime};
use crate::app::services::column_spec::{ColumnRef, DateTimeLayout};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed "now" used by every resolver test
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Build a raw row from string slices
pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn col(index: usize, name: &str) -> ColumnRef {
    ColumnRef::new(index, name)
}

/// Resolver with the ISO date grammar and a fixed reference time
pub fn resolver(layout: DateTimeLayout) -> DateTimeResolver<DateFormat> {
    DateTimeResolver::new(layout, DateFormat::new("YYYY-MM-DD").unwrap())
        .unwrap()
        .with_reference_time(ReferenceTime::Fixed(reference_now()))
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn yds_layout(offset: i64) -> DateTimeLayout {
    DateTimeLayout::YearDaySecond {
        year: col(1, "YEAR"),
        day: col(2, "DOY"),
        second: col(3, "SOD"),
        day_one_offset: offset,
    }
}

pub fn ydjd_layout(offset: i64) -> DateTimeLayout {
    DateTimeLayout::YearDecimalJulian {
        year: col(1, "YEAR"),
        julian_day: col(2, "JD"),
        day_one_offset: offset,
    }
}
