//! Tests for the record checker


use super::RecordChecker;
use crate::app::services::column_spec::ColumnSpecification;
use crate::app::services::datetime_resolver::{DateFormat, ReferenceTime};
use chrono::{TimeZone, Utc};

/// Year/day/second date columns 1-3, then longitude, latitude, sst and region
pub const CRUISE_SPEC: &str = r#"
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

[[column]]
field = "region_id"
input_index = 7
input_name = "REGION"
units = ""

[date_time]
elements = [
  { element = "yearOfYDS", index = 1, column = "YEAR" },
  { element = "dayOfYDS", index = 2, column = "DOY" },
  { element = "secondOfYDS", index = 3, column = "SOD" },
  { element = "dayOneOffset", value = 1 },
]
"#;

pub fn checker() -> RecordChecker<DateFormat> {
    let spec = ColumnSpecification::from_toml_str("cruise.toml", CRUISE_SPEC).unwrap();
    let reference = ReferenceTime::Fixed(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    RecordChecker::new(spec, DateFormat::new("YYYY-MM-DD").unwrap(), reference).unwrap()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Three rows; the second has a day of year past the end of 2006
pub fn cruise_rows() -> Vec<Vec<String>> {
    vec![
        row(&["2006", "162", "3600", "-30.5", "45.25", "18.2", "A"]),
        row(&["2006", "400", "0", "-30.0", "45.5", "18.4", "A"]),
        row(&["2006", "162", "7200", "-29.5", "-999", "18.6", ""]),
    ]
}
