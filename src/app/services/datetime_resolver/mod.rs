//! Date/time resolution for cruise data rows
//!
//! Converts the raw date/time columns of one input row into a UTC timestamp
//! according to the [`DateTimeLayout`] fixed by the column specification.
//!
//! ## Failure classes
//!
//! Resolution failures are per-record and recoverable, so they are reported as
//! [`DateTimeError`] rather than the crate-level [`crate::Error`]:
//! - [`DateTimeError::MissingElement`] - a required value is blank, absent or
//!   equal to its missing-value sentinel
//! - [`DateTimeError::Parse`] - a value is not a number, the components do not
//!   form a calendar date, or the date is before 1900 or in the future
//! - [`DateTimeError::OutOfRange`] - day-of-year, julian day or second-of-day
//!   outside its bounds
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cruise_qc::app::services::column_spec::{ColumnRef, DateTimeLayout};
//! use cruise_qc::app::services::datetime_resolver::{DateFormat, DateTimeResolver, ReferenceTime};
//!
//! let layout = DateTimeLayout::YearDaySecond {
//!     year: ColumnRef::new(1, "YEAR"),
//!     day: ColumnRef::new(2, "DOY"),
//!     second: ColumnRef::new(3, "SOD"),
//!     day_one_offset: 1,
//! };
//! let resolver = DateTimeResolver::new(layout, DateFormat::new("YYYY-MM-DD")?)?
//!     .with_reference_time(ReferenceTime::Fixed(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
//!
//! let row: Vec<String> = ["2006", "162", "0"].iter().map(|s| s.to_string()).collect();
//! assert_eq!(resolver.resolve(&row).unwrap(), Utc.with_ymd_and_hms(2006, 6, 11, 0, 0, 0).unwrap());
//! # Ok::<(), cruise_qc::Error>(())
//! ```

pub mod grammar;

#[cfg(test)]
pub mod tests;

pub use grammar::{DateFormat, DateTimeGrammar};

use crate::app::services::column_spec::{ColumnRef, DateTimeLayout};
use crate::constants::{MIN_VALID_YEAR, SECONDS_PER_DAY, YMD_DATE_PATTERN};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Result of resolving one row
pub type DateTimeResult<T> = std::result::Result<T, DateTimeError>;

/// Per-record date/time resolution failure
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DateTimeError {
    #[error("Missing value for date/time column '{column}'")]
    MissingElement { column: String },

    #[error("{message}")]
    Parse { message: String },

    #[error("{message}")]
    OutOfRange { message: String },
}

impl DateTimeError {
    pub fn missing(column: impl Into<String>) -> Self {
        Self::MissingElement {
            column: column.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }
}

/// The instant against which "in the future" is judged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTime {
    /// Current wall-clock time at each resolution
    #[default]
    WallClock,
    /// A fixed instant
    Fixed(DateTime<Utc>),
}

impl ReferenceTime {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            ReferenceTime::WallClock => Utc::now(),
            ReferenceTime::Fixed(instant) => *instant,
        }
    }
}

/// Resolves date/time columns of rows laid out according to one layout
#[derive(Debug, Clone)]
pub struct DateTimeResolver<G> {
    layout: DateTimeLayout,
    grammar: G,
    ymd_grammar: DateFormat,
    reference: ReferenceTime,
}

impl<G: DateTimeGrammar> DateTimeResolver<G> {
    /// Create a resolver using `grammar` for single and date + time layouts
    pub fn new(layout: DateTimeLayout, grammar: G) -> crate::Result<Self> {
        Ok(Self {
            layout,
            grammar,
            ymd_grammar: DateFormat::new(YMD_DATE_PATTERN)?,
            reference: ReferenceTime::WallClock,
        })
    }

    pub fn with_reference_time(mut self, reference: ReferenceTime) -> Self {
        self.reference = reference;
        self
    }

    pub fn layout(&self) -> &DateTimeLayout {
        &self.layout
    }

    /// Resolve the timestamp of one row
    ///
    /// # Arguments
    ///
    /// * `row` - Raw input fields; layout column indices are 1-based
    ///
    /// # Returns
    ///
    /// The UTC instant, or the classified failure
    pub fn resolve(&self, row: &[String]) -> DateTimeResult<DateTime<Utc>> {
        let naive = match &self.layout {
            DateTimeLayout::Single { date_time } => {
                self.grammar.parse_date_time(text(date_time, row)?)
            }
            DateTimeLayout::DateTime { date, time } => {
                let combined = format!("{} {}", text(date, row)?, text(time, row)?);
                self.grammar.parse_date_time(&combined)
            }
            DateTimeLayout::YearMonthDaySingleTime {
                year,
                month,
                day,
                time,
            } => {
                let combined = format!(
                    "{:04}{:02}{:02} {}",
                    number::<i32>(year, row)?,
                    number::<u32>(month, row)?,
                    number::<u32>(day, row)?,
                    text(time, row)?
                );
                self.ymd_grammar.parse_date_time(&combined)
            }
            DateTimeLayout::Individual {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => individual(row, [year, month, day, hour, minute], second.as_ref()),
            DateTimeLayout::YearDaySecond {
                year,
                day,
                second,
                day_one_offset,
            } => year_day_second(row, year, day, second, *day_one_offset),
            DateTimeLayout::YearDecimalJulian {
                year,
                julian_day,
                day_one_offset,
            } => year_decimal_julian(row, year, julian_day, *day_one_offset),
        }?;

        self.validate(naive.and_utc())
    }

    fn validate(&self, value: DateTime<Utc>) -> DateTimeResult<DateTime<Utc>> {
        if value.year() < MIN_VALID_YEAR {
            return Err(DateTimeError::parse(format!(
                "Date is before {}",
                MIN_VALID_YEAR
            )));
        }
        if value > self.reference.now() {
            return Err(DateTimeError::parse("Date is in the future"));
        }
        Ok(value)
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn text<'r>(column: &ColumnRef, row: &'r [String]) -> DateTimeResult<&'r str> {
    column
        .value_in(row)
        .ok_or_else(|| DateTimeError::missing(column.name.clone()))
}

fn number<T: FromStr>(column: &ColumnRef, row: &[String]) -> DateTimeResult<T> {
    let raw = text(column, row)?;
    raw.parse().map_err(|_| {
        DateTimeError::parse(format!("Invalid {} value '{}'", column.name, raw))
    })
}

fn real(column: &ColumnRef, row: &[String]) -> DateTimeResult<f64> {
    let value: f64 = number(column, row)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DateTimeError::parse(format!(
            "Invalid {} value '{}'",
            column.name, value
        )))
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

fn jan_first(year: i32) -> DateTimeResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DateTimeError::parse(format!("Invalid year {}", year)))
}

/// Add each step to `start`, failing once the sum leaves chrono's range
fn offset_from(start: NaiveDateTime, steps: &[Duration]) -> DateTimeResult<NaiveDateTime> {
    steps
        .iter()
        .try_fold(start, |acc, step| acc.checked_add_signed(*step))
        .ok_or_else(|| DateTimeError::out_of_range(format!("Date after {} is out of range", start)))
}

/// Check a 0-based day of year against the length of `year`
fn check_day_of_year(year: i32, day: i64) -> DateTimeResult<()> {
    if day < 0 {
        return Err(DateTimeError::out_of_range(format!(
            "Day of year {} is before the start of the year",
            day
        )));
    }
    if day >= days_in_year(year) {
        return Err(DateTimeError::out_of_range(format!(
            "Day of year {} is beyond the end of {}",
            day, year
        )));
    }
    Ok(())
}

fn individual(
    row: &[String],
    [year, month, day, hour, minute]: [&ColumnRef; 5],
    second: Option<&ColumnRef>,
) -> DateTimeResult<NaiveDateTime> {
    let y: i32 = number(year, row)?;
    let mo: u32 = number(month, row)?;
    let d: u32 = number(day, row)?;
    let h: u32 = number(hour, row)?;
    let mi: u32 = number(minute, row)?;
    let s = match second {
        Some(column) => real(column, row)?,
        None => 0.0,
    };

    let invalid = || DateTimeError::parse(format!("Invalid date {}/{}/{} {}:{}:{}", y, mo, d, h, mi, s));
    if s < 0.0 {
        return Err(invalid());
    }
    let whole = s.floor();
    let millis = ((s - whole) * 1000.0).floor() as u32;

    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_milli_opt(h, mi, whole as u32, millis))
        .ok_or_else(invalid)
}

fn year_day_second(
    row: &[String],
    year: &ColumnRef,
    day: &ColumnRef,
    second: &ColumnRef,
    day_one_offset: i64,
) -> DateTimeResult<NaiveDateTime> {
    let y: i32 = number(year, row)?;
    let d = number::<i64>(day, row)?
        .checked_sub(day_one_offset)
        .ok_or_else(|| DateTimeError::out_of_range("Day of year is outside the supported range"))?;
    let s: i64 = number(second, row)?;

    let start = jan_first(y)?;
    check_day_of_year(y, d)?;
    if !(0..=SECONDS_PER_DAY).contains(&s) {
        return Err(DateTimeError::out_of_range(format!(
            "Second of day {} is outside 0-{}",
            s, SECONDS_PER_DAY
        )));
    }

    offset_from(start, &[Duration::days(d), Duration::seconds(s)])
}

fn year_decimal_julian(
    row: &[String],
    year: &ColumnRef,
    julian_day: &ColumnRef,
    day_one_offset: i64,
) -> DateTimeResult<NaiveDateTime> {
    let y: i32 = number(year, row)?;
    let julian = real(julian_day, row)? - day_one_offset as f64;

    let start = jan_first(y)?;
    if julian < 0.0 {
        return Err(DateTimeError::out_of_range(format!(
            "Julian day {} is before the start of the year",
            julian
        )));
    }
    let days = julian.floor() as i64;
    check_day_of_year(y, days)?;

    let fraction = julian - days as f64;
    let seconds = (fraction * SECONDS_PER_DAY as f64).floor() as i64;
    let millis = ((fraction - seconds as f64 / SECONDS_PER_DAY as f64) * 1000.0).floor() as i64;

    offset_from(
        start,
        &[
            Duration::days(days),
            Duration::seconds(seconds),
            Duration::milliseconds(millis),
        ],
    )
}
