//! Tests for the column specification module


use super::ColumnSpecification;

/// Standard columns shared by the test specifications
pub const STANDARD_COLUMNS: &str = r#"
[[column]]
field = "longitude"
input_index = 4
input_name = "LON"
units = "degrees_east"

[[column]]
field = "latitude"
input_index = 5
input_name = "LAT"
units = "degrees_north"
missing_value = -999

[[column]]
field = "sst"
input_index = 6
input_name = "SST"
units = "deg C"
converter = "identity"
"#;

/// Build a TOML document from the standard columns plus a date/time element list
pub fn spec_toml(elements: &str) -> String {
    format!("{}\n[date_time]\nelements = [\n{}\n]\n", STANDARD_COLUMNS, elements)
}

/// Parse a specification that is expected to be valid
pub fn load_spec(elements: &str) -> ColumnSpecification {
    ColumnSpecification::from_toml_str("test-spec.toml", &spec_toml(elements))
        .expect("test specification should load")
}

/// Year/day/second elements with a day-one offset of 1
pub const YDS_ELEMENTS: &str = r#"
  { element = "yearOfYDS", index = 1, column = "YEAR" },
  { element = "dayOfYDS", index = 2, column = "DOY" },
  { element = "secondOfYDS", index = 3, column = "SOD" },
  { element = "dayOneOffset", value = 1 },
"#;
