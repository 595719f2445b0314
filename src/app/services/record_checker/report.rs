//! Results of a record checking pass

use crate::app::models::{DataRecord, Finding, RegionId, WoceFlag};
use crate::app::services::woce_aggregator::{RowDataSource, RowPosition};
use crate::constants::{LATITUDE_FIELD, LONGITUDE_FIELD, REGION_FIELD};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One checked row with its resolved timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedRecord {
    pub record: DataRecord,
    /// Absent when the date/time columns could not be resolved
    pub timestamp: Option<DateTime<Utc>>,
}

impl CheckedRecord {
    fn numeric(&self, field: &str) -> Option<f64> {
        self.record.field(field).and_then(|slot| slot.numeric_value())
    }

    fn region(&self) -> RegionId {
        let mut chars = self.record.value(REGION_FIELD).unwrap_or("").trim().chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => RegionId::from_char(code).unwrap_or(RegionId::Global),
            _ => RegionId::Global,
        }
    }
}

/// Row counts of a checking pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub rows_checked: usize,
    /// Rows with at least one BAD flag or finding
    pub rows_with_errors: usize,
    /// Rows whose worst flag is questionable
    pub rows_with_warnings: usize,
}

impl CheckSummary {
    pub fn rows_clean(&self) -> usize {
        self.rows_checked - self.rows_with_errors - self.rows_with_warnings
    }

    pub fn summary(&self) -> String {
        format!(
            "Checked {} rows: {} with errors, {} with warnings",
            self.rows_checked, self.rows_with_errors, self.rows_with_warnings
        )
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Every checked record of a file plus the findings raised on them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub records: Vec<CheckedRecord>,
    /// Findings of all records in row order
    pub findings: Vec<Finding>,
    pub summary: CheckSummary,
    #[serde(skip)]
    time_variable: String,
}

impl CheckReport {
    pub(crate) fn new(records: Vec<CheckedRecord>, time_variable: String) -> Self {
        let mut summary = CheckSummary {
            rows_checked: records.len(),
            ..CheckSummary::default()
        };
        let mut findings = Vec::new();

        for checked in &records {
            let worst = checked
                .record
                .findings()
                .iter()
                .map(|f| f.severity)
                .fold(checked.record.worst_flag(), WoceFlag::max);
            match worst {
                WoceFlag::Bad => summary.rows_with_errors += 1,
                WoceFlag::Questionable => summary.rows_with_warnings += 1,
                _ => {}
            }
            findings.extend(checked.record.findings().iter().cloned());
        }

        Self {
            records,
            findings,
            summary,
            time_variable,
        }
    }

    /// Variable name under which resolved timestamps are served
    pub fn time_variable(&self) -> &str {
        &self.time_variable
    }

    pub fn has_errors(&self) -> bool {
        self.summary.rows_with_errors > 0
    }
}

impl RowDataSource for CheckReport {
    fn position(&self, row_index: usize) -> Option<RowPosition> {
        let checked = self.records.get(row_index)?;
        Some(RowPosition {
            longitude: checked.numeric(LONGITUDE_FIELD).unwrap_or(f64::NAN),
            latitude: checked.numeric(LATITUDE_FIELD).unwrap_or(f64::NAN),
            timestamp: checked.timestamp,
            region: checked.region(),
        })
    }

    /// Timestamps are served as seconds since the epoch
    fn variable_values(&self, variable: &str) -> Option<Vec<Option<f64>>> {
        if variable == self.time_variable {
            return Some(
                self.records
                    .iter()
                    .map(|r| r.timestamp.map(|t| t.timestamp_millis() as f64 / 1000.0))
                    .collect(),
            );
        }
        if !self.records.iter().any(|r| r.record.field(variable).is_some()) {
            return None;
        }
        Some(self.records.iter().map(|r| r.numeric(variable)).collect())
    }
}
