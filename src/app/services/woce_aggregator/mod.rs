//! WOCE flag event aggregation
//!
//! Turns the row-level findings of a checker run, plus the rows a reviewer
//! flagged by hand, into the smallest ordered list of [`WoceEvent`]s. Rows that
//! share flag, column and comment become locations of one event.
//!
//! ## Ordering
//!
//! Flag entries are sorted by:
//! 1. flag, questionable before bad
//! 2. column, entries without a column last
//! 3. source, checker findings before reviewer flags
//! 4. comment, case-insensitively, then exactly
//! 5. row
//!
//! A new event starts whenever flag, column or comment changes, so the output
//! is fully determined by the inputs.
//!
//! Only BAD findings are taken from the checker. Questionable checker findings
//! stay out of the event list until the submission workflow accepts them.

#[cfg(test)]
pub mod tests;

use crate::app::models::{DataLocation, EventStamp, Finding, RegionId, WoceEvent, WoceFlag};
use crate::constants::{PI_SUBCOMMENT_JOINER, pi_provided_comment};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

// =============================================================================
// Collaborator Interfaces
// =============================================================================

/// Maps 0-based input column indices to data variable names
pub trait ColumnVariables {
    fn variable_name(&self, column_index: usize) -> Option<String>;
}

impl ColumnVariables for HashMap<usize, String> {
    fn variable_name(&self, column_index: usize) -> Option<String> {
        self.get(&column_index).cloned()
    }
}

/// Where and when one data row was measured
///
/// Coordinates that are missing from the row are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub region: RegionId,
}

/// Read access to the checked data rows
pub trait RowDataSource {
    /// Position of a 0-based row, `None` when the row does not exist
    fn position(&self, row_index: usize) -> Option<RowPosition>;

    /// All values of one variable indexed by row, `None` when the variable is
    /// not available
    fn variable_values(&self, variable: &str) -> Option<Vec<Option<f64>>>;
}

// =============================================================================
// Reviewer Flags
// =============================================================================

/// Rows flagged by a reviewer, each with an optional sub-comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewerFlags {
    questionable: BTreeMap<usize, Option<String>>,
    bad: BTreeMap<usize, Option<String>>,
}

impl ReviewerFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a 0-based row; only questionable and bad flags are accepted
    pub fn flag_row(&mut self, flag: WoceFlag, row_index: usize, comment: Option<String>) -> Result<()> {
        if !flag.is_reportable() {
            return Err(Error::programmer(
                "reviewer flag",
                format!("'{}' flags cannot be asserted by a reviewer", flag.description()),
            ));
        }
        let comment = comment.filter(|c| !c.trim().is_empty());
        if flag == WoceFlag::Bad {
            self.bad.insert(row_index, comment);
        } else {
            self.questionable.insert(row_index, comment);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.questionable.is_empty() && self.bad.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = FlagEntry> + '_ {
        let questionable = self
            .questionable
            .iter()
            .map(|(row, sub)| FlagEntry::reviewer(WoceFlag::Questionable, *row, sub.as_deref()));
        let bad = self
            .bad
            .iter()
            .map(|(row, sub)| FlagEntry::reviewer(WoceFlag::Bad, *row, sub.as_deref()));
        questionable.chain(bad)
    }
}

// =============================================================================
// Flag Entries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    Checker,
    Reviewer,
}

/// One flagged row before grouping
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlagEntry {
    flag: WoceFlag,
    /// 0-based column
    column: Option<usize>,
    source: Source,
    comment: String,
    /// 0-based row
    row_index: usize,
}

impl FlagEntry {
    fn reviewer(flag: WoceFlag, row_index: usize, sub_comment: Option<&str>) -> Self {
        let code = flag.as_char().unwrap_or(' ');
        let comment = match sub_comment {
            Some(sub) => format!("{}{}{}", pi_provided_comment(code), PI_SUBCOMMENT_JOINER, sub),
            None => pi_provided_comment(code),
        };
        Self {
            flag,
            column: None,
            source: Source::Reviewer,
            comment,
            row_index,
        }
    }

    /// Checker finding as an entry, if it qualifies for an event
    fn from_finding(finding: &Finding) -> Option<Self> {
        if !finding.severity.raises_checker_event() {
            return None;
        }
        let row_index = finding.row_number.filter(|row| *row >= 1)? - 1;
        let column = match finding.column_number {
            Some(0) => return None,
            Some(column) => Some(column - 1),
            None => None,
        };
        Some(Self {
            flag: finding.severity,
            column,
            source: Source::Checker,
            comment: finding.effective_comment().to_string(),
            row_index,
        })
    }

    fn same_event(&self, other: &FlagEntry) -> bool {
        self.flag == other.flag && self.column == other.column && self.comment == other.comment
    }
}

fn sorted_entries(findings: &[Finding], reviewer: &ReviewerFlags) -> Vec<FlagEntry> {
    let mut entries: Vec<FlagEntry> = findings
        .iter()
        .filter_map(FlagEntry::from_finding)
        .chain(reviewer.entries())
        .collect();

    entries.sort_by_cached_key(|e| {
        (
            e.flag,
            e.column.is_none(),
            e.column,
            e.source,
            e.comment.to_lowercase(),
            e.comment.clone(),
            e.row_index,
        )
    });
    entries.dedup();
    entries
}

// =============================================================================
// Aggregator
// =============================================================================

/// Builds WOCE events against one set of checked rows
pub struct WoceEventAggregator<'a, C, R> {
    columns: &'a C,
    rows: &'a R,
    stamp: &'a EventStamp,
}

impl<'a, C: ColumnVariables, R: RowDataSource> WoceEventAggregator<'a, C, R> {
    pub fn new(columns: &'a C, rows: &'a R, stamp: &'a EventStamp) -> Self {
        Self {
            columns,
            rows,
            stamp,
        }
    }

    /// Aggregate findings and reviewer flags into ordered WOCE events
    ///
    /// # Arguments
    ///
    /// * `findings` - Checker findings; only BAD findings with a row are used
    /// * `reviewer` - Rows flagged by the reviewer
    ///
    /// # Returns
    ///
    /// Events in sort order. Nothing is read from the row source when no entry
    /// qualifies. A row the source cannot locate is an aggregation error.
    pub fn aggregate(&self, findings: &[Finding], reviewer: &ReviewerFlags) -> Result<Vec<WoceEvent>> {
        let entries = sorted_entries(findings, reviewer);
        if entries.is_empty() {
            debug!("No WOCE flags to aggregate");
            return Ok(Vec::new());
        }

        let mut events: Vec<WoceEvent> = Vec::new();
        let mut value_cache: HashMap<String, Option<Vec<Option<f64>>>> = HashMap::new();
        let mut previous: Option<&FlagEntry> = None;

        for entry in &entries {
            if !previous.is_some_and(|p| p.same_event(entry)) {
                let variable = entry
                    .column
                    .and_then(|column| self.columns.variable_name(column))
                    .filter(|name| {
                        value_cache
                            .entry(name.clone())
                            .or_insert_with(|| self.rows.variable_values(name))
                            .is_some()
                    });
                trace!(
                    "New WOCE event: flag {}, variable {:?}, comment '{}'",
                    entry.flag, variable, entry.comment
                );
                events.push(WoceEvent::new(entry.flag, variable, entry.comment.clone(), self.stamp));
            }
            previous = Some(entry);

            let position = self.rows.position(entry.row_index).ok_or_else(|| {
                Error::aggregation(format!("No data available for row {}", entry.row_index + 1))
            })?;

            let Some(event) = events.last_mut() else {
                continue;
            };
            let data_value = event
                .variable_name
                .as_ref()
                .and_then(|name| value_cache.get(name))
                .and_then(|values| values.as_ref())
                .and_then(|values| values.get(entry.row_index).copied().flatten());

            event.locations.push(DataLocation {
                row_number: entry.row_index + 1,
                longitude: position.longitude,
                latitude: position.latitude,
                timestamp: position.timestamp,
                region: position.region,
                data_value,
            });
        }

        debug!(
            "Aggregated {} flagged rows into {} WOCE events",
            entries.len(),
            events.len()
        );
        Ok(events)
    }
}
