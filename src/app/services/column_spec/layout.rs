//! Date/time column layouts and their structural dispatch
//!
//! A layout is chosen once, when the column specification is built, by
//! matching the ordered list of declared child-element names against the known
//! shapes. Names compare case-insensitively; length and order must match.

use super::declaration::{DateElementDeclaration, DeclaredValue};
use crate::{Error, Result};
use serde::Serialize;
use tracing::debug;

// =============================================================================
// Column References
// =============================================================================

/// Sentinel marking a missing value in an input column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValue(String);

impl MissingValue {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self(sentinel.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `raw` spells the sentinel, textually or numerically
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw == self.0 {
            return true;
        }
        match (raw.parse::<f64>(), self.0.parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// A physical input column: 1-based index, header name and missing sentinel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
    pub missing_value: Option<MissingValue>,
}

impl ColumnRef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            missing_value: None,
        }
    }

    pub fn with_missing_value(mut self, sentinel: impl Into<String>) -> Self {
        self.missing_value = Some(MissingValue::new(sentinel));
        self
    }

    /// Raw text of this column in `row`
    ///
    /// Absent when the row is too short, the cell is blank, or the cell holds
    /// the missing-value sentinel.
    pub fn value_in<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        let raw = row.get(self.index.checked_sub(1)?)?.trim();
        if raw.is_empty() {
            return None;
        }
        match &self.missing_value {
            Some(sentinel) if sentinel.matches(raw) => None,
            _ => Some(raw),
        }
    }
}

// =============================================================================
// Layouts
// =============================================================================

/// Supported date/time column layouts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DateTimeLayout {
    /// One column holding date and time
    Single { date_time: ColumnRef },

    /// Separate date and time columns
    DateTime { date: ColumnRef, time: ColumnRef },

    /// One column per calendar component; seconds are optional
    Individual {
        year: ColumnRef,
        month: ColumnRef,
        day: ColumnRef,
        hour: ColumnRef,
        minute: ColumnRef,
        second: Option<ColumnRef>,
    },

    /// Year, day of year and second of day
    YearDaySecond {
        year: ColumnRef,
        day: ColumnRef,
        second: ColumnRef,
        day_one_offset: i64,
    },

    /// Year and decimal julian day
    YearDecimalJulian {
        year: ColumnRef,
        julian_day: ColumnRef,
        day_one_offset: i64,
    },

    /// Year, month and day columns plus a single time column
    YearMonthDaySingleTime {
        year: ColumnRef,
        month: ColumnRef,
        day: ColumnRef,
        time: ColumnRef,
    },
}

impl DateTimeLayout {
    /// Short name used in logs and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            DateTimeLayout::Single { .. } => "single",
            DateTimeLayout::DateTime { .. } => "date + time",
            DateTimeLayout::Individual { second: Some(_), .. } => "individual with seconds",
            DateTimeLayout::Individual { second: None, .. } => "individual without seconds",
            DateTimeLayout::YearDaySecond { .. } => "year, day, second",
            DateTimeLayout::YearDecimalJulian { .. } => "year, decimal julian day",
            DateTimeLayout::YearMonthDaySingleTime { .. } => "year, month, day + time",
        }
    }

    /// Every input column referenced by this layout, in declaration order
    pub fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            DateTimeLayout::Single { date_time } => vec![date_time],
            DateTimeLayout::DateTime { date, time } => vec![date, time],
            DateTimeLayout::Individual {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => {
                let mut cols = vec![year, month, day, hour, minute];
                cols.extend(second.iter());
                cols
            }
            DateTimeLayout::YearDaySecond {
                year, day, second, ..
            } => vec![year, day, second],
            DateTimeLayout::YearDecimalJulian {
                year, julian_day, ..
            } => vec![year, julian_day],
            DateTimeLayout::YearMonthDaySingleTime {
                year,
                month,
                day,
                time,
            } => vec![year, month, day, time],
        }
    }
}

// =============================================================================
// Shape Matching
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Single,
    DateTime,
    IndividualWithSecond,
    IndividualNoSecond,
    YearDaySecond,
    YearDecimalJulian,
    YearMonthDaySingleTime,
}

const DAY_ONE_OFFSET: &str = "dayOneOffset";

const SHAPES: &[(Shape, &[&str])] = &[
    (Shape::Single, &["single"]),
    (Shape::DateTime, &["date", "time"]),
    (
        Shape::IndividualWithSecond,
        &["year", "month", "day", "hour", "minute", "second"],
    ),
    (
        Shape::IndividualNoSecond,
        &["year", "month", "day", "hour", "minute"],
    ),
    (
        Shape::YearDaySecond,
        &["yearOfYDS", "dayOfYDS", "secondOfYDS", DAY_ONE_OFFSET],
    ),
    (
        Shape::YearDecimalJulian,
        &["yearOfYDJD", "decimalJulianDate", DAY_ONE_OFFSET],
    ),
    (
        Shape::YearMonthDaySingleTime,
        &["year", "month", "day", "time"],
    ),
];

fn shape_matches(names: &[&str], elements: &[DateElementDeclaration]) -> bool {
    names.len() == elements.len()
        && names
            .iter()
            .zip(elements)
            .all(|(name, element)| name.eq_ignore_ascii_case(element.element.trim()))
}

/// Build the layout described by an ordered element list
///
/// # Arguments
///
/// * `source_id` - Identifier of the declaration, used in errors
/// * `elements` - Declared child elements in document order
///
/// # Returns
///
/// The layout of the single matching shape; no match or several matches give
/// a configuration error.
pub fn build_layout(source_id: &str, elements: &[DateElementDeclaration]) -> Result<DateTimeLayout> {
    let matching: Vec<Shape> = SHAPES
        .iter()
        .filter(|(_, names)| shape_matches(names, elements))
        .map(|(shape, _)| *shape)
        .collect();

    let shape = match matching.as_slice() {
        [shape] => *shape,
        [] => {
            let declared: Vec<&str> = elements.iter().map(|e| e.element.as_str()).collect();
            return Err(Error::configuration(
                source_id,
                format!("Unrecognized date/time element sequence {:?}", declared),
            ));
        }
        _ => {
            return Err(Error::configuration(
                source_id,
                format!("Ambiguous date/time element sequence matches {:?}", matching),
            ));
        }
    };
    debug!("Date/time elements in {} match shape {:?}", source_id, shape);

    let col = |i: usize| column_ref(source_id, &elements[i]);
    let layout = match shape {
        Shape::Single => DateTimeLayout::Single { date_time: col(0)? },
        Shape::DateTime => DateTimeLayout::DateTime {
            date: col(0)?,
            time: col(1)?,
        },
        Shape::IndividualWithSecond | Shape::IndividualNoSecond => DateTimeLayout::Individual {
            year: col(0)?,
            month: col(1)?,
            day: col(2)?,
            hour: col(3)?,
            minute: col(4)?,
            second: match shape {
                Shape::IndividualWithSecond => Some(col(5)?),
                _ => None,
            },
        },
        Shape::YearDaySecond => DateTimeLayout::YearDaySecond {
            year: col(0)?,
            day: col(1)?,
            second: col(2)?,
            day_one_offset: day_one_offset(source_id, &elements[3])?,
        },
        Shape::YearDecimalJulian => DateTimeLayout::YearDecimalJulian {
            year: col(0)?,
            julian_day: col(1)?,
            day_one_offset: day_one_offset(source_id, &elements[2])?,
        },
        Shape::YearMonthDaySingleTime => DateTimeLayout::YearMonthDaySingleTime {
            year: col(0)?,
            month: col(1)?,
            day: col(2)?,
            time: col(3)?,
        },
    };
    Ok(layout)
}

fn column_ref(source_id: &str, element: &DateElementDeclaration) -> Result<ColumnRef> {
    let index = element.index.as_ref().ok_or_else(|| {
        Error::configuration(
            source_id,
            format!("Date/time element '{}' has no input column index", element.element),
        )
    })?;
    let index = parse_index(source_id, &element.element, index)?;

    let name = element
        .column
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            Error::configuration(
                source_id,
                format!("Date/time element '{}' has no input column name", element.element),
            )
        })?;

    let mut column = ColumnRef::new(index, name);
    if let Some(sentinel) = &element.missing_value {
        column = column.with_missing_value(sentinel.to_string());
    }
    Ok(column)
}

fn day_one_offset(source_id: &str, element: &DateElementDeclaration) -> Result<i64> {
    let value = element.value.as_ref().ok_or_else(|| {
        Error::configuration(source_id, format!("'{}' requires a value", DAY_ONE_OFFSET))
    })?;
    value.as_integer().ok_or_else(|| {
        Error::configuration(
            source_id,
            format!("Invalid {} value '{}'", DAY_ONE_OFFSET, value),
        )
    })
}

/// Parse a declared 1-based input column index
pub(crate) fn parse_index(source_id: &str, owner: &str, value: &DeclaredValue) -> Result<usize> {
    value.as_index().ok_or_else(|| {
        Error::configuration(
            source_id,
            format!("Invalid input column index '{}' for '{}'", value, owner),
        )
    })
}
