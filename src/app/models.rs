//! Data models for cruise quality control
//!
//! This module contains the flag lattices, QC event and WOCE event structures
//! exchanged between the quality-control services. Per-record field state lives
//! in [`record`].

pub mod record;

use crate::constants::{qc_flags, regions, woce_flags};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use record::{DataRecord, FieldSlot};

// =============================================================================
// WOCE Flag Lattice
// =============================================================================

/// Per-field WOCE quality flag
///
/// Variants are declared in severity order so the derived `Ord` gives the
/// lattice `Unflagged < Good < Questionable < Bad`. A field's flag only ever
/// moves upward through this lattice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum WoceFlag {
    /// No flag has been assigned
    #[default]
    Unflagged,

    /// Measurement is acceptable
    Good,

    /// Measurement is questionable
    Questionable,

    /// Measurement is bad
    Bad,
}

impl WoceFlag {
    /// The more severe of two flags
    pub fn max(self, other: WoceFlag) -> WoceFlag {
        if other > self { other } else { self }
    }

    /// WOCE character code, absent for `Unflagged`
    pub fn as_char(self) -> Option<char> {
        match self {
            WoceFlag::Unflagged => None,
            WoceFlag::Good => Some(woce_flags::GOOD),
            WoceFlag::Questionable => Some(woce_flags::QUESTIONABLE),
            WoceFlag::Bad => Some(woce_flags::BAD),
        }
    }

    /// Parse a WOCE character code
    pub fn from_char(code: char) -> Result<Self> {
        match code {
            woce_flags::GOOD => Ok(WoceFlag::Good),
            woce_flags::QUESTIONABLE => Ok(WoceFlag::Questionable),
            woce_flags::BAD => Ok(WoceFlag::Bad),
            _ => Err(Error::event_log(format!("Invalid WOCE flag '{}'", code))),
        }
    }

    /// True for flags that can be carried by a WOCE event
    pub fn is_reportable(self) -> bool {
        matches!(self, WoceFlag::Questionable | WoceFlag::Bad)
    }

    /// True for automatic checker findings that raise a WOCE event
    ///
    /// Questionable findings are reportable but stay on the row until the
    /// submission workflow accepts them.
    pub fn raises_checker_event(self) -> bool {
        self == WoceFlag::Bad
    }

    /// Get human-readable description of this flag
    pub fn description(self) -> &'static str {
        match self {
            WoceFlag::Unflagged => "not flagged",
            WoceFlag::Good => "good",
            WoceFlag::Questionable => "questionable",
            WoceFlag::Bad => "bad",
        }
    }
}

impl fmt::Display for WoceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(code) => write!(f, "{}", code),
            None => write!(f, " "),
        }
    }
}

impl FromStr for WoceFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(WoceFlag::Unflagged);
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => WoceFlag::from_char(code),
            _ => Err(Error::event_log(format!("Invalid WOCE flag '{}'", s))),
        }
    }
}

// =============================================================================
// Dataset QC Flags
// =============================================================================

/// Dataset-level QC flag as recorded in the QC event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QcFlag {
    AcceptA,
    AcceptB,
    AcceptC,
    AcceptD,
    AcceptE,
    /// Reviewer comment; never affects the effective flag
    Comment,
    New,
    /// Regions disagree on the effective flag
    Conflict,
    /// Dataset rename marker; never affects the effective flag
    Renamed,
    Suspended,
    Updated,
    Excluded,
}

impl QcFlag {
    /// Parse a QC flag character; the legacy fail code reads as suspended
    pub fn from_char(code: char) -> Result<Self> {
        match code {
            qc_flags::ACCEPT_A => Ok(QcFlag::AcceptA),
            qc_flags::ACCEPT_B => Ok(QcFlag::AcceptB),
            qc_flags::ACCEPT_C => Ok(QcFlag::AcceptC),
            qc_flags::ACCEPT_D => Ok(QcFlag::AcceptD),
            qc_flags::ACCEPT_E => Ok(QcFlag::AcceptE),
            qc_flags::COMMENT => Ok(QcFlag::Comment),
            qc_flags::NEW => Ok(QcFlag::New),
            qc_flags::CONFLICT => Ok(QcFlag::Conflict),
            qc_flags::RENAMED => Ok(QcFlag::Renamed),
            qc_flags::SUSPEND | qc_flags::LEGACY_FAIL => Ok(QcFlag::Suspended),
            qc_flags::UPDATED => Ok(QcFlag::Updated),
            qc_flags::EXCLUDE => Ok(QcFlag::Excluded),
            _ => Err(Error::event_log(format!("Invalid QC flag '{}'", code))),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            QcFlag::AcceptA => qc_flags::ACCEPT_A,
            QcFlag::AcceptB => qc_flags::ACCEPT_B,
            QcFlag::AcceptC => qc_flags::ACCEPT_C,
            QcFlag::AcceptD => qc_flags::ACCEPT_D,
            QcFlag::AcceptE => qc_flags::ACCEPT_E,
            QcFlag::Comment => qc_flags::COMMENT,
            QcFlag::New => qc_flags::NEW,
            QcFlag::Conflict => qc_flags::CONFLICT,
            QcFlag::Renamed => qc_flags::RENAMED,
            QcFlag::Suspended => qc_flags::SUSPEND,
            QcFlag::Updated => qc_flags::UPDATED,
            QcFlag::Excluded => qc_flags::EXCLUDE,
        }
    }

    /// False for markers that are recorded in the log but carry no flag value
    pub fn carries_value(self) -> bool {
        !matches!(self, QcFlag::Comment | QcFlag::Renamed)
    }

    /// Dataset status shown to users for this flag
    pub fn status(self) -> &'static str {
        match self {
            QcFlag::AcceptA => "Flag A",
            QcFlag::AcceptB => "Flag B",
            QcFlag::AcceptC => "Flag C",
            QcFlag::AcceptD => "Flag D",
            QcFlag::AcceptE => "Flag E",
            QcFlag::Comment => "Comment",
            QcFlag::New | QcFlag::Updated => "Submitted",
            QcFlag::Conflict => "Conflict",
            QcFlag::Renamed => "Renamed",
            QcFlag::Suspended => "Suspended",
            QcFlag::Excluded => "Excluded",
        }
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// =============================================================================
// Regions
// =============================================================================

/// Geographic region partitioning the QC event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionId {
    Global,
    NorthPacific,
    TropicalPacific,
    NorthAtlantic,
    TropicalAtlantic,
    Indian,
    Coastal,
    SouthernOceans,
    Arctic,
}

impl RegionId {
    pub fn from_char(code: char) -> Result<Self> {
        match code {
            regions::GLOBAL => Ok(RegionId::Global),
            regions::NORTH_PACIFIC => Ok(RegionId::NorthPacific),
            regions::TROPICAL_PACIFIC => Ok(RegionId::TropicalPacific),
            regions::NORTH_ATLANTIC => Ok(RegionId::NorthAtlantic),
            regions::TROPICAL_ATLANTIC => Ok(RegionId::TropicalAtlantic),
            regions::INDIAN => Ok(RegionId::Indian),
            regions::COASTAL => Ok(RegionId::Coastal),
            regions::SOUTHERN_OCEANS => Ok(RegionId::SouthernOceans),
            regions::ARCTIC => Ok(RegionId::Arctic),
            _ => Err(Error::event_log(format!("Unknown region ID '{}'", code))),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            RegionId::Global => regions::GLOBAL,
            RegionId::NorthPacific => regions::NORTH_PACIFIC,
            RegionId::TropicalPacific => regions::TROPICAL_PACIFIC,
            RegionId::NorthAtlantic => regions::NORTH_ATLANTIC,
            RegionId::TropicalAtlantic => regions::TROPICAL_ATLANTIC,
            RegionId::Indian => regions::INDIAN,
            RegionId::Coastal => regions::COASTAL,
            RegionId::SouthernOceans => regions::SOUTHERN_OCEANS,
            RegionId::Arctic => regions::ARCTIC,
        }
    }

    /// Human-readable region name
    pub fn display_name(self) -> &'static str {
        match self {
            RegionId::Global => "Global",
            RegionId::NorthPacific => "North Pacific",
            RegionId::TropicalPacific => "Tropical Pacific",
            RegionId::NorthAtlantic => "North Atlantic",
            RegionId::TropicalAtlantic => "Tropical Atlantic",
            RegionId::Indian => "Indian",
            RegionId::Coastal => "Coastal",
            RegionId::SouthernOceans => "Southern Oceans",
            RegionId::Arctic => "Arctic",
        }
    }

    /// Get all region identifiers
    pub fn all_values() -> [RegionId; 9] {
        [
            RegionId::Global,
            RegionId::NorthPacific,
            RegionId::TropicalPacific,
            RegionId::NorthAtlantic,
            RegionId::TropicalAtlantic,
            RegionId::Indian,
            RegionId::Coastal,
            RegionId::SouthernOceans,
            RegionId::Arctic,
        ]
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// =============================================================================
// QC Event Log
// =============================================================================

/// One dataset-level QC event, validated and ready for reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcEvent {
    pub flag: QcFlag,
    pub region: RegionId,
    pub timestamp: DateTime<Utc>,

    /// Reviewer login name
    #[serde(default)]
    pub username: String,

    /// Reviewer display name
    #[serde(default)]
    pub realname: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub dataset_id: String,

    #[serde(default)]
    pub version: String,
}

impl QcEvent {
    /// Create an event with empty reviewer and dataset metadata
    pub fn new(flag: QcFlag, region: RegionId, timestamp: DateTime<Utc>) -> Self {
        Self {
            flag,
            region,
            timestamp,
            username: String::new(),
            realname: String::new(),
            comment: String::new(),
            dataset_id: String::new(),
            version: String::new(),
        }
    }

    pub fn with_reviewer(mut self, username: impl Into<String>, realname: impl Into<String>) -> Self {
        self.username = username.into();
        self.realname = realname.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_dataset(mut self, dataset_id: impl Into<String>, version: impl Into<String>) -> Self {
        self.dataset_id = dataset_id.into();
        self.version = version.into();
        self
    }
}

/// Raw QC event log row as stored by the event store
///
/// Flag and region are kept as text so that blank and unknown codes can be
/// reported by [`crate::app::services::qc_reconciler::read_event_log`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcLogEntry {
    pub flag: String,
    pub epoch_seconds: i64,
    pub region: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub realname: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub dataset_id: String,

    #[serde(default)]
    pub version: String,
}

impl QcLogEntry {
    pub fn new(flag: impl Into<String>, epoch_seconds: i64, region: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            epoch_seconds,
            region: region.into(),
            username: String::new(),
            realname: String::new(),
            comment: String::new(),
            dataset_id: String::new(),
            version: String::new(),
        }
    }

    /// Attach the reviewer who recorded the entry
    pub fn recorded_by(mut self, username: impl Into<String>, realname: impl Into<String>) -> Self {
        self.username = username.into();
        self.realname = realname.into();
        self
    }
}

// =============================================================================
// Findings and WOCE Events
// =============================================================================

/// A row-level validation finding produced while checking a data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: WoceFlag,

    /// 1-based data row, absent for file-level findings
    pub row_number: Option<usize>,

    /// 1-based input column, absent when the finding is not tied to a column
    pub column_number: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// General comment; may be empty
    pub comment: String,

    /// Detailed comment used when the general comment is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    pub fn new(severity: WoceFlag, comment: impl Into<String>) -> Self {
        Self {
            severity,
            row_number: None,
            column_number: None,
            column_name: None,
            observed: None,
            expected: None,
            comment: comment.into(),
            detail: None,
        }
    }

    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    pub fn in_column(mut self, column_number: usize, column_name: impl Into<String>) -> Self {
        self.column_number = Some(column_number);
        self.column_name = Some(column_name.into());
        self
    }

    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn with_values(mut self, observed: Option<String>, expected: Option<String>) -> Self {
        self.observed = observed;
        self.expected = expected;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The general comment, or the detailed one when the general is empty
    pub fn effective_comment(&self) -> &str {
        if self.comment.is_empty() {
            self.detail.as_deref().unwrap_or("")
        } else {
            &self.comment
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_number {
            Some(row) => write!(f, "row {}", row)?,
            None => write!(f, "file")?,
        }
        if let Some(name) = &self.column_name {
            write!(f, ", column {}", name)?;
        }
        write!(f, " [{}]: {}", self.severity.description(), self.effective_comment())
    }
}

/// Position and value of one flagged data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLocation {
    /// 1-based data row
    pub row_number: usize,
    pub longitude: f64,
    pub latitude: f64,
    /// Absent when the row's date/time could not be resolved
    pub timestamp: Option<DateTime<Utc>>,
    pub region: RegionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_value: Option<f64>,
}

/// Metadata stamped onto every WOCE event of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStamp {
    pub dataset_id: String,
    pub version: String,
    pub flag_date: DateTime<Utc>,
    pub username: String,
    pub realname: String,
}

/// A WOCE flag applied to a set of data locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoceEvent {
    pub flag: WoceFlag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    pub comment: String,
    pub locations: Vec<DataLocation>,
    pub dataset_id: String,
    pub version: String,
    pub flag_date: DateTime<Utc>,
    pub username: String,
    pub realname: String,
}

impl WoceEvent {
    /// Create an event with no locations
    pub fn new(
        flag: WoceFlag,
        variable_name: Option<String>,
        comment: impl Into<String>,
        stamp: &EventStamp,
    ) -> Self {
        Self {
            flag,
            variable_name,
            comment: comment.into(),
            locations: Vec::new(),
            dataset_id: stamp.dataset_id.clone(),
            version: stamp.version.clone(),
            flag_date: stamp.flag_date,
            username: stamp.username.clone(),
            realname: stamp.realname.clone(),
        }
    }

    /// Row numbers of this event's locations in order
    pub fn row_numbers(&self) -> Vec<usize> {
        self.locations.iter().map(|loc| loc.row_number).collect()
    }
}
