//! Per-record field state and the monotonic flag model
//!
//! Every output field of a data record is a [`FieldSlot`]. Slots created with
//! [`FieldSlot::flaggable`] carry a [`WoceFlag`] that can only be raised; slots
//! created with [`FieldSlot::plain`] hold a value only and reject flag calls.

use super::{Finding, WoceFlag};
use crate::{Error, Result};
use serde::Serialize;
use tracing::trace;

/// Named output value of a data record with optional flag capability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSlot {
    name: String,
    value: Option<String>,
    /// `None` when the field has no flag capability
    flag: Option<WoceFlag>,
    /// 1-based input column feeding this field
    column_number: Option<usize>,
}

impl FieldSlot {
    /// Create a field that carries a WOCE flag
    pub fn flaggable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            flag: Some(WoceFlag::Unflagged),
            column_number: None,
        }
    }

    /// Create a value-only field
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            flag: None,
            column_number: None,
        }
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn with_column(mut self, column_number: usize) -> Self {
        self.column_number = Some(column_number);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Value parsed as a number, absent when missing or not numeric
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn column_number(&self) -> Option<usize> {
        self.column_number
    }

    pub fn is_flaggable(&self) -> bool {
        self.flag.is_some()
    }

    /// Current flag, `None` for fields without flag capability
    pub fn flag(&self) -> Option<WoceFlag> {
        self.flag
    }

    /// Raise the flag of this field, reporting the escalation
    ///
    /// # Arguments
    ///
    /// * `flag` - Requested flag
    /// * `row_number` - 1-based row the field belongs to
    /// * `comment` - Explanation attached to the finding
    /// * `expected` - Description of an acceptable value, if any
    ///
    /// # Returns
    ///
    /// A finding when the flag was raised, `None` when `flag` does not exceed
    /// the current flag. Fields without flag capability give a programmer error.
    pub fn set_flag(
        &mut self,
        flag: WoceFlag,
        row_number: usize,
        comment: &str,
        expected: Option<&str>,
    ) -> Result<Option<Finding>> {
        if !self.raise(flag)? {
            return Ok(None);
        }

        let mut finding = Finding::new(flag, comment)
            .at_row(row_number)
            .with_column_name(self.name.clone())
            .with_values(self.value.clone(), expected.map(str::to_string));
        finding.column_number = self.column_number;
        Ok(Some(finding))
    }

    /// Raise the flag of this field without reporting it
    ///
    /// Used for fields whose flag follows from another field's failure.
    /// Returns whether the flag changed.
    pub fn set_cascade_flag(&mut self, flag: WoceFlag) -> Result<bool> {
        self.raise(flag)
    }

    fn raise(&mut self, flag: WoceFlag) -> Result<bool> {
        let current = self.flag.ok_or_else(|| {
            Error::programmer(self.name.clone(), "field does not carry a WOCE flag")
        })?;

        if flag <= current {
            return Ok(false);
        }
        trace!("Field {} flag raised from {:?} to {:?}", self.name, current, flag);
        self.flag = Some(flag);
        Ok(true)
    }
}

/// Output fields of one input row plus the findings raised while filling them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRecord {
    row_number: usize,
    fields: Vec<FieldSlot>,
    findings: Vec<Finding>,
}

impl DataRecord {
    /// Create an empty record for a 1-based row
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            fields: Vec::new(),
            findings: Vec::new(),
        }
    }

    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// Add a field, replacing any field of the same name
    pub fn insert(&mut self, slot: FieldSlot) {
        match self.fields.iter_mut().find(|f| f.name == slot.name) {
            Some(existing) => *existing = slot,
            None => self.fields.push(slot),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldSlot::value)
    }

    pub fn flag(&self, name: &str) -> Option<WoceFlag> {
        self.field(name).and_then(FieldSlot::flag)
    }

    pub fn set_value(&mut self, name: &str, value: Option<String>) -> Result<()> {
        self.field_mut(name)?.set_value(value);
        Ok(())
    }

    /// Raise a field's flag and keep the finding when it escalates
    pub fn set_flag(
        &mut self,
        name: &str,
        flag: WoceFlag,
        comment: &str,
        expected: Option<&str>,
    ) -> Result<()> {
        let row_number = self.row_number;
        if let Some(finding) = self.field_mut(name)?.set_flag(flag, row_number, comment, expected)? {
            self.findings.push(finding);
        }
        Ok(())
    }

    /// Raise a field's flag without recording a finding
    pub fn set_cascade_flag(&mut self, name: &str, flag: WoceFlag) -> Result<()> {
        self.field_mut(name)?.set_cascade_flag(flag)?;
        Ok(())
    }

    /// Record a finding that is not tied to a single field escalation
    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Most severe flag over all flaggable fields
    pub fn worst_flag(&self) -> WoceFlag {
        self.fields
            .iter()
            .filter_map(FieldSlot::flag)
            .fold(WoceFlag::Unflagged, WoceFlag::max)
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FieldSlot> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::programmer(name, "no such field in data record"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_escalation_reports_finding() {
        let mut slot = FieldSlot::flaggable("sst").with_value(Some("45.0".to_string()));
        let finding = slot
            .set_flag(WoceFlag::Bad, 12, "SST above maximum", Some("<= 40"))
            .unwrap()
            .expect("escalation should produce a finding");

        assert_eq!(finding.severity, WoceFlag::Bad);
        assert_eq!(finding.row_number, Some(12));
        assert_eq!(finding.observed.as_deref(), Some("45.0"));
        assert_eq!(finding.expected.as_deref(), Some("<= 40"));
        assert_eq!(slot.flag(), Some(WoceFlag::Bad));
    }

    #[test]
    fn test_no_op_flag_reports_nothing() {
        let mut slot = FieldSlot::flaggable("sal");
        slot.set_flag(WoceFlag::Bad, 1, "bad", None).unwrap();

        let repeat = slot.set_flag(WoceFlag::Bad, 1, "bad again", None).unwrap();
        let lower = slot.set_flag(WoceFlag::Questionable, 1, "lower", None).unwrap();

        assert!(repeat.is_none());
        assert!(lower.is_none());
        assert_eq!(slot.flag(), Some(WoceFlag::Bad));
    }

    #[test]
    fn test_further_escalation_reports_again() {
        let mut slot = FieldSlot::flaggable("sal");
        assert!(slot.set_flag(WoceFlag::Questionable, 3, "q", None).unwrap().is_some());
        assert!(slot.set_flag(WoceFlag::Bad, 3, "b", None).unwrap().is_some());
    }

    #[test]
    fn test_cascade_flag_is_silent_and_monotonic() {
        let mut slot = FieldSlot::flaggable("yr");
        assert!(slot.set_cascade_flag(WoceFlag::Bad).unwrap());
        assert!(!slot.set_cascade_flag(WoceFlag::Good).unwrap());
        assert_eq!(slot.flag(), Some(WoceFlag::Bad));
    }

    #[test]
    fn test_plain_field_rejects_flags() {
        let mut slot = FieldSlot::plain("iso_date");
        let err = slot.set_flag(WoceFlag::Bad, 1, "bad", None).unwrap_err();
        assert!(err.is_programmer_error());
        assert!(slot.set_cascade_flag(WoceFlag::Bad).unwrap_err().is_programmer_error());
        assert_eq!(slot.flag(), None);
    }

    #[test]
    fn test_record_collects_findings() {
        let mut record = DataRecord::new(7);
        record.insert(FieldSlot::flaggable("sst").with_column(5));
        record.insert(FieldSlot::flaggable("yr"));

        record.set_flag("sst", WoceFlag::Questionable, "warm", None).unwrap();
        record.set_cascade_flag("yr", WoceFlag::Bad).unwrap();

        assert_eq!(record.findings().len(), 1);
        assert_eq!(record.findings()[0].column_number, Some(5));
        assert_eq!(record.worst_flag(), WoceFlag::Bad);
    }

    #[test]
    fn test_record_unknown_field_is_programmer_error() {
        let mut record = DataRecord::new(1);
        let err = record.set_flag("missing", WoceFlag::Bad, "x", None).unwrap_err();
        assert!(err.is_programmer_error());
    }

    fn any_flag() -> impl Strategy<Value = WoceFlag> {
        prop_oneof![
            Just(WoceFlag::Unflagged),
            Just(WoceFlag::Good),
            Just(WoceFlag::Questionable),
            Just(WoceFlag::Bad),
        ]
    }

    proptest! {
        #[test]
        fn prop_flag_is_max_of_supplied(calls in prop::collection::vec((any_flag(), any::<bool>()), 0..32)) {
            let mut slot = FieldSlot::flaggable("field");
            let mut findings = 0usize;
            let mut expected_findings = 0usize;
            let mut running = WoceFlag::Unflagged;

            for (flag, cascade) in &calls {
                if *cascade {
                    slot.set_cascade_flag(*flag).unwrap();
                } else {
                    if *flag > running {
                        expected_findings += 1;
                    }
                    if slot.set_flag(*flag, 1, "c", None).unwrap().is_some() {
                        findings += 1;
                    }
                }
                running = running.max(*flag);
                prop_assert_eq!(slot.flag(), Some(running));
            }

            let expected = calls.iter().map(|(f, _)| *f).fold(WoceFlag::Unflagged, WoceFlag::max);
            prop_assert_eq!(slot.flag(), Some(expected));
            prop_assert_eq!(findings, expected_findings);
        }
    }
}
