//! Per-file record checking
//!
//! Drives one pass over the data rows of a cruise file: every row becomes a
//! [`DataRecord`] holding the standard fields named by the column
//! specification and the date/time outputs derived from the resolved
//! timestamp. Date/time failures never abort the pass; they are recorded as a
//! BAD finding on the row and cascade BAD onto every date/time output.
//!
//! The resulting [`CheckReport`] can be handed straight to the WOCE event
//! aggregator, since it implements
//! [`RowDataSource`](crate::app::services::woce_aggregator::RowDataSource).

pub mod report;

#[cfg(test)]
pub mod tests;

pub use report::{CheckReport, CheckSummary, CheckedRecord};

use crate::Result;
use crate::app::models::{DataRecord, FieldSlot, Finding, WoceFlag};
use crate::app::services::column_spec::ColumnSpecification;
use crate::app::services::datetime_resolver::{
    DateTimeError, DateTimeGrammar, DateTimeResolver, ReferenceTime,
};
use crate::constants::{DATE_COLUMN_NAME, DEFAULT_TIME_VARIABLE, date_fields};
use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use tracing::{debug, info};

/// Checks the rows of one data file against its column specification
#[derive(Debug, Clone)]
pub struct RecordChecker<G> {
    spec: ColumnSpecification,
    resolver: DateTimeResolver<G>,
    time_variable: String,
}

impl<G: DateTimeGrammar> RecordChecker<G> {
    /// Create a checker for one file
    ///
    /// # Arguments
    ///
    /// * `spec` - Column specification of the file
    /// * `grammar` - Grammar for single and date + time layouts
    /// * `reference` - Clock that decides which dates lie in the future
    pub fn new(spec: ColumnSpecification, grammar: G, reference: ReferenceTime) -> Result<Self> {
        let resolver = DateTimeResolver::new(spec.date_time_layout().clone(), grammar)?
            .with_reference_time(reference);
        debug!(
            "Record checker for '{}' using {} layout",
            spec.source_id(),
            resolver.layout().kind_name()
        );
        Ok(Self {
            spec,
            resolver,
            time_variable: DEFAULT_TIME_VARIABLE.to_string(),
        })
    }

    /// Use another variable name for the resolved timestamp
    pub fn with_time_variable(mut self, name: impl Into<String>) -> Self {
        self.time_variable = name.into();
        self
    }

    pub fn spec(&self) -> &ColumnSpecification {
        &self.spec
    }

    pub fn time_variable(&self) -> &str {
        &self.time_variable
    }

    /// Check one data row
    ///
    /// # Arguments
    ///
    /// * `row_number` - 1-based position of the row in the data file
    /// * `fields` - Raw input fields of the row
    ///
    /// # Returns
    ///
    /// The filled record and its resolved timestamp, absent when the date/time
    /// columns could not be resolved
    pub fn check_row(&self, row_number: usize, fields: &[String]) -> Result<CheckedRecord> {
        let mut record = DataRecord::new(row_number);

        for mapping in self.spec.fields() {
            let value = mapping.column.value_in(fields).map(str::to_string);
            record.insert(
                FieldSlot::flaggable(mapping.field.as_str())
                    .with_value(value)
                    .with_column(mapping.input_index()),
            );
        }
        for name in date_fields::CASCADE_TARGETS {
            record.insert(FieldSlot::flaggable(*name));
        }
        record.insert(FieldSlot::plain(date_fields::ISO_DATE));

        let timestamp = match self.resolver.resolve(fields) {
            Ok(timestamp) => {
                fill_date_fields(&mut record, &timestamp)?;
                Some(timestamp)
            }
            Err(error) => {
                flag_date_failure(&mut record, &error)?;
                None
            }
        };

        Ok(CheckedRecord { record, timestamp })
    }

    /// Check every row of a data file
    ///
    /// Rows are numbered from 1 in input order. Per-record date/time failures
    /// become findings; only misuse of the record model is an error.
    pub fn check_rows(&self, rows: &[Vec<String>]) -> Result<CheckReport> {
        let mut records = Vec::with_capacity(rows.len());
        for (index, fields) in rows.iter().enumerate() {
            records.push(self.check_row(index + 1, fields)?);
        }

        let report = CheckReport::new(records, self.time_variable.clone());
        info!("{}", report.summary.summary());
        Ok(report)
    }
}

fn fill_date_fields(record: &mut DataRecord, timestamp: &DateTime<Utc>) -> Result<()> {
    let seconds = timestamp.second() as f64 + timestamp.nanosecond() as f64 / 1e9;
    let values = [
        (date_fields::YEAR, timestamp.year().to_string()),
        (date_fields::MONTH, timestamp.month().to_string()),
        (date_fields::DAY, timestamp.day().to_string()),
        (date_fields::HOUR, timestamp.hour().to_string()),
        (date_fields::MINUTE, timestamp.minute().to_string()),
        (date_fields::SECOND, seconds.to_string()),
        (
            date_fields::ISO_DATE,
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
    ];
    for (name, value) in values {
        record.set_value(name, Some(value))?;
    }
    Ok(())
}

fn flag_date_failure(record: &mut DataRecord, error: &DateTimeError) -> Result<()> {
    debug!("Row {}: {}", record.row_number(), error);
    record.add_finding(
        Finding::new(WoceFlag::Bad, error.to_string())
            .at_row(record.row_number())
            .with_column_name(DATE_COLUMN_NAME),
    );
    for name in date_fields::CASCADE_TARGETS {
        record.set_cascade_flag(name, WoceFlag::Bad)?;
    }
    Ok(())
}
