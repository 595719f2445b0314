//! Date/time string grammars
//!
//! Single-column and date + time layouts hand their text to a caller-supplied
//! [`DateTimeGrammar`]. [`DateFormat`] is the standard grammar: a date pattern
//! such as `YYYY-MM-DD` or `MM/DD/YY`, accepted with any of the separators
//! `-`, `/`, `.` or none, followed by a time in one of five fixed forms.

use super::DateTimeError;
use crate::constants::TWO_DIGIT_YEAR_PIVOT_START;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Parses date/time text into a naive (UTC) date-time
pub trait DateTimeGrammar {
    fn parse_date_time(&self, text: &str) -> std::result::Result<NaiveDateTime, DateTimeError>;
}

impl<G: DateTimeGrammar + ?Sized> DateTimeGrammar for &G {
    fn parse_date_time(&self, text: &str) -> std::result::Result<NaiveDateTime, DateTimeError> {
        (**self).parse_date_time(text)
    }
}

/// Time forms tried after each date variant, in order
const TIME_FORMATS: &[&str] = &[" %H:%M:%S%.f", " %H:%M:%S", " %H:%M", " %H%M%S", " %H%M"];

/// Separators a date pattern may use; each is also tried with the others
const SEPARATORS: &[char] = &['-', '/', '.'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Year(usize),
    Month(usize),
    Day(usize),
    Separator,
}

/// Date pattern grammar with separator variants and two-digit year pivot
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    pattern: String,
    date_formats: Vec<String>,
    two_digit_year: bool,
}

impl DateFormat {
    /// Build the grammar for a date pattern
    ///
    /// Patterns are made of `Y`, `M` and `D` runs (case-insensitive) and the
    /// separators `-`, `/` and `.`. Years take two or four letters, months and
    /// days one or two. Anything else is a configuration error.
    pub fn new(pattern: &str) -> Result<Self> {
        let tokens = tokenize(pattern)?;

        let count = |f: fn(&DateToken) -> bool| tokens.iter().filter(|t| f(t)).count();
        if count(|t| matches!(t, DateToken::Year(_))) != 1
            || count(|t| matches!(t, DateToken::Month(_))) != 1
            || count(|t| matches!(t, DateToken::Day(_))) != 1
        {
            return Err(Error::configuration(
                "date format",
                format!(
                    "Date format '{}' must contain exactly one year, month and day",
                    pattern
                ),
            ));
        }

        let mut date_formats: Vec<String> = Vec::with_capacity(SEPARATORS.len() + 1);
        for sep in SEPARATORS.iter().map(|c| Some(*c)).chain([None]) {
            let format = chrono_format(&tokens, sep);
            if !date_formats.contains(&format) {
                date_formats.push(format);
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            two_digit_year: tokens.contains(&DateToken::Year(2)),
            date_formats,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a date without a time, giving midnight
    pub fn parse_date(&self, text: &str) -> std::result::Result<NaiveDateTime, DateTimeError> {
        let text = text.trim();
        self.date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| self.apply_pivot(dt))
            .ok_or_else(|| DateTimeError::parse(format!(
                "Unable to parse date string '{}': It is not in a supported format",
                text
            )))
    }

    /// Compact date output, e.g. `20060611`
    pub fn format_date(value: &NaiveDateTime) -> String {
        value.format("%Y%m%d").to_string()
    }

    /// Compact date-time output, e.g. `20060611120000.000`
    pub fn format_date_time(value: &NaiveDateTime) -> String {
        value.format("%Y%m%d%H%M%S%.3f").to_string()
    }

    fn apply_pivot(&self, value: NaiveDateTime) -> NaiveDateTime {
        // chrono reads two-digit years as 1970-2069
        if self.two_digit_year && value.year() >= TWO_DIGIT_YEAR_PIVOT_START + 100 {
            value.with_year(value.year() - 100).unwrap_or(value)
        } else {
            value
        }
    }
}

impl DateTimeGrammar for DateFormat {
    fn parse_date_time(&self, text: &str) -> std::result::Result<NaiveDateTime, DateTimeError> {
        let text = text.trim();
        for date_format in &self.date_formats {
            for time_format in TIME_FORMATS {
                let format = format!("{}{}", date_format, time_format);
                if let Ok(parsed) = NaiveDateTime::parse_from_str(text, &format) {
                    return Ok(self.apply_pivot(parsed));
                }
            }
        }
        Err(DateTimeError::parse(format!(
            "Unable to parse date-time string '{}': It is not in a supported format",
            text
        )))
    }
}

fn tokenize(pattern: &str) -> Result<Vec<DateToken>> {
    let mut tokens: Vec<DateToken> = Vec::new();
    let mut chars = pattern.trim().chars().peekable();

    while let Some(c) = chars.next() {
        let letter = c.to_ascii_uppercase();
        if SEPARATORS.contains(&c) {
            tokens.push(DateToken::Separator);
            continue;
        }
        if !matches!(letter, 'Y' | 'M' | 'D') {
            return Err(Error::configuration(
                "date format",
                format!("Unsupported character in date format string: '{}'", c),
            ));
        }

        let mut run = 1;
        while chars.peek().is_some_and(|n| n.to_ascii_uppercase() == letter) {
            chars.next();
            run += 1;
        }

        let token = match (letter, run) {
            ('Y', 2 | 4) => DateToken::Year(run),
            ('M', 1 | 2) => DateToken::Month(run),
            ('D', 1 | 2) => DateToken::Day(run),
            _ => {
                return Err(Error::configuration(
                    "date format",
                    format!("Unsupported field width {} for '{}' in '{}'", run, c, pattern),
                ));
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn chrono_format(tokens: &[DateToken], separator: Option<char>) -> String {
    let mut format = String::new();
    for token in tokens {
        match token {
            DateToken::Year(4) => format.push_str("%Y"),
            DateToken::Year(_) => format.push_str("%y"),
            DateToken::Month(_) => format.push_str("%m"),
            DateToken::Day(_) => format.push_str("%d"),
            DateToken::Separator => {
                if let Some(sep) = separator {
                    format.push(sep);
                }
            }
        }
    }
    format
}
