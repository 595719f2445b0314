//! Tests for resolving each date/time layout

use super::*;
use crate::app::services::datetime_resolver::DateTimeError;
use chrono::Timelike;

// =============================================================================
// Year / day / second
// =============================================================================

#[test]
fn test_year_day_second_with_offset() {
    let resolver = resolver(yds_layout(1));
    assert_eq!(
        resolver.resolve(&row(&["2006", "162", "0"])).unwrap(),
        utc(2006, 6, 11, 0, 0, 0)
    );
    assert_eq!(
        resolver.resolve(&row(&["2006", "1", "3661"])).unwrap(),
        utc(2006, 1, 1, 1, 1, 1)
    );
}

#[test]
fn test_year_day_second_leap_year_boundary() {
    let resolver = resolver(yds_layout(1));

    assert_eq!(
        resolver.resolve(&row(&["2004", "366", "0"])).unwrap(),
        utc(2004, 12, 31, 0, 0, 0)
    );
    assert!(matches!(
        resolver.resolve(&row(&["2004", "367", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2005", "366", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
}

#[test]
fn test_year_day_second_bounds() {
    let resolver = resolver(yds_layout(1));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "0", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "10", "-1"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "10", "86401"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    // a full day of seconds rolls over to the next midnight
    assert_eq!(
        resolver.resolve(&row(&["2006", "10", "86400"])).unwrap(),
        utc(2006, 1, 11, 0, 0, 0)
    );
}

#[test]
fn test_year_day_second_zero_offset() {
    let resolver = resolver(yds_layout(0));
    assert_eq!(
        resolver.resolve(&row(&["2006", "0", "43200"])).unwrap(),
        utc(2006, 1, 1, 12, 0, 0)
    );
}

#[test]
fn test_year_day_second_past_last_representable_date() {
    let resolver = resolver(yds_layout(1));
    // 262142-12-31 plus a full day of seconds leaves chrono's calendar
    assert!(matches!(
        resolver.resolve(&row(&["262142", "365", "86400"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["262142", "365", "0"])),
        Err(DateTimeError::Parse { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["262143", "1", "0"])),
        Err(DateTimeError::Parse { .. })
    ));
}

#[test]
fn test_year_day_second_extreme_day_values() {
    let resolver = resolver(yds_layout(1));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "-9223372036854775808", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "9223372036854775807", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));

    let resolver = super::resolver(yds_layout(i64::MIN));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "1", "0"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
}

// =============================================================================
// Year / decimal julian day
// =============================================================================

#[test]
fn test_year_decimal_julian() {
    let resolver = resolver(ydjd_layout(1));
    assert_eq!(
        resolver.resolve(&row(&["2006", "162.5"])).unwrap(),
        utc(2006, 6, 11, 12, 0, 0)
    );
    assert_eq!(
        resolver.resolve(&row(&["2006", "1.25"])).unwrap(),
        utc(2006, 1, 1, 6, 0, 0)
    );
}

#[test]
fn test_year_decimal_julian_bounds() {
    let resolver = resolver(ydjd_layout(1));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "0.5"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2005", "366.1"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(resolver.resolve(&row(&["2004", "366.1"])).is_ok());
}

#[test]
fn test_year_decimal_julian_extreme_values() {
    let resolver = resolver(ydjd_layout(1));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "1e300"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "-1e300"])),
        Err(DateTimeError::OutOfRange { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["262142", "365.9999"])),
        Err(DateTimeError::Parse { .. })
    ));
}

#[test]
fn test_year_decimal_julian_rejects_non_numeric() {
    let resolver = resolver(ydjd_layout(0));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "abc"])),
        Err(DateTimeError::Parse { .. })
    ));
}

// =============================================================================
// Individual components
// =============================================================================

fn individual_layout(with_second: bool) -> DateTimeLayout {
    DateTimeLayout::Individual {
        year: col(1, "YR"),
        month: col(2, "MON"),
        day: col(3, "DAY"),
        hour: col(4, "HH"),
        minute: col(5, "MM"),
        second: with_second.then(|| col(6, "SS")),
    }
}

#[test]
fn test_individual_with_fractional_seconds() {
    let resolver = resolver(individual_layout(true));
    let value = resolver
        .resolve(&row(&["2006", "6", "11", "12", "30", "15.75"]))
        .unwrap();
    assert_eq!(value.second(), 15);
    assert_eq!(value.timestamp_subsec_millis(), 750);
}

#[test]
fn test_individual_without_second_defaults_to_zero() {
    let resolver = resolver(individual_layout(false));
    assert_eq!(
        resolver.resolve(&row(&["2006", "6", "11", "12", "30"])).unwrap(),
        utc(2006, 6, 11, 12, 30, 0)
    );
}

#[test]
fn test_individual_invalid_calendar_date() {
    let resolver = resolver(individual_layout(true));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "2", "30", "0", "0", "0"])),
        Err(DateTimeError::Parse { .. })
    ));
    assert!(matches!(
        resolver.resolve(&row(&["2006", "6", "11", "24", "0", "0"])),
        Err(DateTimeError::Parse { .. })
    ));
}

#[test]
fn test_individual_blank_second_is_missing() {
    let resolver = resolver(individual_layout(true));
    assert_eq!(
        resolver.resolve(&row(&["2006", "6", "11", "12", "30", ""])),
        Err(DateTimeError::missing("SS"))
    );
}

// =============================================================================
// Text layouts
// =============================================================================

#[test]
fn test_single_column() {
    let resolver = resolver(DateTimeLayout::Single {
        date_time: col(2, "WHEN"),
    });
    assert_eq!(
        resolver.resolve(&row(&["x", "2006-06-11 12:00:00"])).unwrap(),
        utc(2006, 6, 11, 12, 0, 0)
    );
}

#[test]
fn test_date_and_time_columns() {
    let resolver = resolver(DateTimeLayout::DateTime {
        date: col(1, "DATE"),
        time: col(2, "TIME"),
    });
    assert_eq!(
        resolver.resolve(&row(&["2006/06/11", "08:15"])).unwrap(),
        utc(2006, 6, 11, 8, 15, 0)
    );
}

#[test]
fn test_year_month_day_single_time() {
    let resolver = resolver(DateTimeLayout::YearMonthDaySingleTime {
        year: col(1, "YR"),
        month: col(2, "MON"),
        day: col(3, "DAY"),
        time: col(4, "TIME"),
    });
    assert_eq!(
        resolver.resolve(&row(&["2006", "6", "1", "08:15:30"])).unwrap(),
        utc(2006, 6, 1, 8, 15, 30)
    );
    assert!(matches!(
        resolver.resolve(&row(&["2006", "June", "1", "08:15:30"])),
        Err(DateTimeError::Parse { .. })
    ));
}

// =============================================================================
// Shared validation
// =============================================================================

#[test]
fn test_missing_value_sentinel() {
    let layout = DateTimeLayout::YearDaySecond {
        year: col(1, "YEAR"),
        day: col(2, "DOY").with_missing_value("-999"),
        second: col(3, "SOD"),
        day_one_offset: 1,
    };
    let resolver = resolver(layout);
    assert_eq!(
        resolver.resolve(&row(&["2006", "-999", "0"])),
        Err(DateTimeError::missing("DOY"))
    );
    assert_eq!(
        resolver.resolve(&row(&["2006"])),
        Err(DateTimeError::missing("DOY"))
    );
}

#[test]
fn test_date_before_1900_rejected() {
    let resolver = resolver(yds_layout(1));
    assert_eq!(
        resolver.resolve(&row(&["1899", "10", "0"])),
        Err(DateTimeError::parse("Date is before 1900"))
    );
}

#[test]
fn test_future_date_rejected() {
    let resolver = resolver(yds_layout(1));
    assert_eq!(
        resolver.resolve(&row(&["2024", "2", "0"])),
        Err(DateTimeError::parse("Date is in the future"))
    );
    // exactly "now" is accepted
    assert_eq!(
        resolver.resolve(&row(&["2024", "1", "0"])).unwrap(),
        reference_now()
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        DateTimeError::missing("DOY").to_string(),
        "Missing value for date/time column 'DOY'"
    );
    assert_eq!(DateTimeError::parse("Date is in the future").to_string(), "Date is in the future");
}
