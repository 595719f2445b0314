//! Application constants for cruise QC
//!
//! This module contains the character codes, reserved names and default values
//! used throughout the quality-control core.

// =============================================================================
// WOCE Flag Codes
// =============================================================================

/// WOCE flag characters as stored in data files and flag events
pub mod woce_flags {
    /// Acceptable measurement
    pub const GOOD: char = '2';

    /// Questionable measurement
    pub const QUESTIONABLE: char = '3';

    /// Bad measurement
    pub const BAD: char = '4';

    /// Data not reported
    pub const NOT_REPORTED: char = '9';
}

// =============================================================================
// Dataset QC Flag Codes
// =============================================================================

/// Dataset-level QC flag characters found in the QC event log
pub mod qc_flags {
    pub const ACCEPT_A: char = 'A';
    pub const ACCEPT_B: char = 'B';
    pub const ACCEPT_C: char = 'C';
    pub const ACCEPT_D: char = 'D';
    pub const ACCEPT_E: char = 'E';

    /// Reviewer comment; carries no flag value
    pub const COMMENT: char = 'H';

    /// Newly submitted dataset
    pub const NEW: char = 'N';

    /// Regions disagree on the effective flag
    pub const CONFLICT: char = 'Q';

    /// Dataset was renamed; carries no flag value
    pub const RENAMED: char = 'R';

    /// Suspended pending fixes
    pub const SUSPEND: char = 'S';

    /// Legacy code for a failed dataset, read as suspended
    pub const LEGACY_FAIL: char = 'F';

    /// Updated submission
    pub const UPDATED: char = 'U';

    /// Excluded from the release
    pub const EXCLUDE: char = 'X';
}

// =============================================================================
// Region Identifiers
// =============================================================================

/// Region identifier characters used to partition QC events
pub mod regions {
    pub const GLOBAL: char = 'G';
    pub const NORTH_PACIFIC: char = 'N';
    pub const TROPICAL_PACIFIC: char = 'T';
    pub const NORTH_ATLANTIC: char = 'A';
    pub const TROPICAL_ATLANTIC: char = 'Z';
    pub const INDIAN: char = 'I';
    pub const COASTAL: char = 'C';
    pub const SOUTHERN_OCEANS: char = 'O';
    pub const ARCTIC: char = 'R';
}

// =============================================================================
// Date/Time Constraints
// =============================================================================

/// Earliest acceptable year for a measurement timestamp
pub const MIN_VALID_YEAR: i32 = 1900;

/// Seconds in one day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Earliest acceptable QC event time in seconds since the epoch
/// (thirty mean Gregorian years, early January 2000)
pub const MIN_QC_EVENT_EPOCH_SECONDS: i64 = 946_708_560;

/// Date pattern used for the year/month/day + time layout
pub const YMD_DATE_PATTERN: &str = "YYYYMMDD";

/// Default date pattern for single and date + time layouts
pub const DEFAULT_DATE_PATTERN: &str = "YYYY-MM-DD";

/// Two-digit years are mapped onto the century starting at this year
pub const TWO_DIGIT_YEAR_PIVOT_START: i32 = 1950;

// =============================================================================
// Record Field Names
// =============================================================================

/// Output field names derived from the resolved timestamp
pub mod date_fields {
    pub const YEAR: &str = "yr";
    pub const MONTH: &str = "mon";
    pub const DAY: &str = "day";
    pub const HOUR: &str = "hh";
    pub const MINUTE: &str = "mm";
    pub const SECOND: &str = "ss";
    pub const ISO_DATE: &str = "iso_date";

    /// Fields flagged BAD whenever the timestamp cannot be resolved
    pub const CASCADE_TARGETS: &[&str] = &[YEAR, MONTH, DAY, HOUR, MINUTE, SECOND];
}

/// Column name reported for date/time findings
pub const DATE_COLUMN_NAME: &str = "Date/Time";

/// Output field holding the measurement longitude
pub const LONGITUDE_FIELD: &str = "longitude";

/// Output field holding the measurement latitude
pub const LATITUDE_FIELD: &str = "latitude";

/// Optional output field holding a region identifier
pub const REGION_FIELD: &str = "region_id";

/// Variable name shared by every date/time input column
pub const DEFAULT_TIME_VARIABLE: &str = "time";

// =============================================================================
// WOCE Event Defaults
// =============================================================================

/// Username stamped on events raised by the automated checker
pub const CHECKER_USERNAME: &str = "automated.data.checker";

/// Real name stamped on events raised by the automated checker
pub const CHECKER_REALNAME: &str = "automated data checker";

/// Prefix of comments attached to reviewer-asserted flags
pub const PI_PROVIDED_COMMENT_START: &str = "PI provided WOCE-";

/// Joins the reviewer comment and a row-level sub-comment
pub const PI_SUBCOMMENT_JOINER: &str = " with comment/subflag: ";

/// Reviewer comment for a given WOCE flag character
pub fn pi_provided_comment(flag_char: char) -> String {
    format!("{}{} flag", PI_PROVIDED_COMMENT_START, flag_char)
}
