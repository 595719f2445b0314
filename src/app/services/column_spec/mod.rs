//! Column specification for cruise data files
//!
//! A column specification maps logical output fields onto physical input
//! columns (1-based index, header name, units, missing-value sentinel and an
//! optional converter reference) and fixes the date/time layout in effect for
//! the file. It is built once per file and is immutable afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use cruise_qc::app::services::column_spec::ColumnSpecification;
//!
//! let spec = ColumnSpecification::from_toml_str(
//!     "inline",
//!     r#"
//!     [[column]]
//!     field = "latitude"
//!     input_index = 2
//!     input_name = "LAT"
//!     units = "degrees_north"
//!
//!     [date_time]
//!     elements = [{ element = "single", index = 1, column = "DATETIME" }]
//!     "#,
//! )?;
//!
//! assert_eq!(spec.input_column_name(2), Some("LAT"));
//! # Ok::<(), cruise_qc::Error>(())
//! ```

pub mod declaration;
pub mod layout;

#[cfg(test)]
pub mod tests;

pub use declaration::SpecDeclaration;
pub use layout::{ColumnRef, DateTimeLayout, MissingValue};

use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Mapping of one logical output field onto its input column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMapping {
    pub field: String,
    pub column: ColumnRef,
    pub units: String,
    /// Name of the converter to apply, resolved by the caller
    pub converter: Option<String>,
}

impl FieldMapping {
    pub fn input_index(&self) -> usize {
        self.column.index
    }

    pub fn input_name(&self) -> &str {
        &self.column.name
    }
}

/// Immutable column specification of one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpecification {
    source_id: String,
    fields: Vec<FieldMapping>,
    date_time: DateTimeLayout,
}

impl ColumnSpecification {
    /// Parse a TOML column mapping
    ///
    /// # Arguments
    ///
    /// * `source_id` - Identifier of the mapping (usually its path), carried
    ///   by every configuration error
    /// * `text` - TOML document
    pub fn from_toml_str(source_id: &str, text: &str) -> Result<Self> {
        let declaration: SpecDeclaration = toml::from_str(text).map_err(|e| {
            Error::configuration_with_cause(source_id, "Invalid column specification", e)
        })?;
        Self::from_declaration(source_id, declaration)
    }

    /// Validate a parsed declaration and build the specification
    pub fn from_declaration(source_id: &str, declaration: SpecDeclaration) -> Result<Self> {
        let mut fields: Vec<FieldMapping> = Vec::with_capacity(declaration.columns.len());

        for column in declaration.columns {
            let field = column.field.trim().to_string();
            if field.is_empty() {
                return Err(Error::configuration(source_id, "Column with an empty field name"));
            }
            if fields.iter().any(|f| f.field == field) {
                return Err(Error::configuration(
                    source_id,
                    format!("Duplicate field '{}'", field),
                ));
            }

            let index = layout::parse_index(source_id, &field, &column.input_index)?;
            let input_name = column.input_name.trim();
            if input_name.is_empty() {
                return Err(Error::configuration(
                    source_id,
                    format!("Field '{}' has no input column name", field),
                ));
            }

            let mut column_ref = ColumnRef::new(index, input_name);
            if let Some(sentinel) = &column.missing_value {
                column_ref = column_ref.with_missing_value(sentinel.to_string());
            }

            fields.push(FieldMapping {
                field,
                column: column_ref,
                units: column.units.trim().to_string(),
                converter: column.converter.filter(|c| !c.trim().is_empty()),
            });
        }

        let date_time = declaration
            .date_time
            .ok_or_else(|| Error::configuration(source_id, "No date/time columns specified"))?;
        let date_time = layout::build_layout(source_id, &date_time.elements)?;

        debug!(
            "Loaded column specification {}: {} fields, {} date/time layout",
            source_id,
            fields.len(),
            date_time.kind_name()
        );

        Ok(Self {
            source_id: source_id.to_string(),
            fields,
            date_time,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Mapping for a logical output field
    pub fn column_info(&self, field: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Standard field mappings in declaration order
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }

    pub fn date_time_layout(&self) -> &DateTimeLayout {
        &self.date_time
    }

    /// Every input column name the file must provide
    pub fn required_input_column_names(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .map(|f| f.column.name.clone())
            .chain(self.date_time.columns().into_iter().map(|c| c.name.clone()))
            .collect()
    }

    /// Header name of a 1-based input column
    ///
    /// Standard fields are searched first, then the date/time columns.
    pub fn input_column_name(&self, index: usize) -> Option<&str> {
        self.fields
            .iter()
            .map(|f| &f.column)
            .chain(self.date_time.columns())
            .find(|c| c.index == index)
            .map(|c| c.name.as_str())
    }

    /// Variable name carried by each 0-based input column
    ///
    /// Standard fields map to their own name; every date/time column maps to
    /// `time_variable`.
    pub fn column_variables(&self, time_variable: &str) -> HashMap<usize, String> {
        let mut variables: HashMap<usize, String> = self
            .date_time
            .columns()
            .into_iter()
            .map(|c| (c.index - 1, time_variable.to_string()))
            .collect();
        for mapping in &self.fields {
            variables.insert(mapping.column.index - 1, mapping.field.clone());
        }
        variables
    }
}
