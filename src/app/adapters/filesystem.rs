//! Filesystem adapters
//!
//! Loads column specifications, data files and QC event logs from disk. The
//! services themselves never touch the filesystem.

use crate::app::models::QcLogEntry;
use crate::app::services::column_spec::ColumnSpecification;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load a TOML column specification; its path becomes the source id
pub fn load_column_spec(path: &Path) -> Result<ColumnSpecification> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::io(
            format!("Failed to read column specification {}", path.display()),
            e,
        )
    })?;
    ColumnSpecification::from_toml_str(&path.display().to_string(), &text)
}

/// Header and raw rows of a CSV data file
#[derive(Debug, Clone, PartialEq)]
pub struct DataFile {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataFile {
    /// Input column names the specification needs but the header lacks
    pub fn missing_input_columns(&self, spec: &ColumnSpecification) -> Vec<String> {
        spec.required_input_column_names()
            .into_iter()
            .filter(|name| !self.headers.iter().any(|h| h.trim() == name))
            .collect()
    }
}

/// Read a CSV data file with a header row
///
/// Rows may be shorter or longer than the header; cells beyond a short row
/// read as missing.
pub fn read_data_file(path: &Path) -> Result<DataFile> {
    let file_name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to open data file", Some(e)))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to read CSV headers", Some(e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            Error::csv_parsing(&file_name, format!("Failed to read data row {}", index + 1), Some(e))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    info!("Read {} data rows from {}", rows.len(), file_name);
    Ok(DataFile { headers, rows })
}

/// Read the data rows of a CSV data file; row numbers are 1-based positions
pub fn read_data_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    Ok(read_data_file(path)?.rows)
}

/// Read a QC event log with the header `flag,epoch_seconds,region`
pub fn read_event_log_file(path: &Path) -> Result<Vec<QcLogEntry>> {
    let file_name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to open QC event log", Some(e)))?;

    let mut entries = Vec::new();
    for (index, result) in reader.deserialize::<QcLogEntry>().enumerate() {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Unreadable QC event log entry {} in {}", index + 1, file_name);
                return Err(Error::csv_parsing(
                    &file_name,
                    format!("Invalid QC event log entry {}", index + 1),
                    Some(e),
                ));
            }
        }
    }

    debug!("Read {} QC event log entries from {}", entries.len(), file_name);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SPEC: &str = r#"
[[column]]
field = "latitude"
input_index = 2
input_name = "LAT"
units = "degrees_north"

[date_time]
elements = [{ element = "single", index = 1, column = "DATETIME" }]
"#;

    #[test]
    fn test_load_column_spec_uses_path_as_source() {
        let file = write_temp(SPEC);
        let spec = load_column_spec(file.path()).unwrap();
        assert_eq!(spec.source_id(), file.path().display().to_string());
        assert_eq!(spec.input_column_name(2), Some("LAT"));
    }

    #[test]
    fn test_load_column_spec_missing_file() {
        let err = load_column_spec(Path::new("/nonexistent/spec.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_column_spec_reports_source() {
        let file = write_temp("[[column]]\nfield = \"x\"\n");
        let err = load_column_spec(file.path()).unwrap_err();
        match err {
            Error::Configuration { source_id, .. } => {
                assert_eq!(source_id, file.path().display().to_string())
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_read_data_file() {
        let file = write_temp("DATETIME,LAT\n2006-06-11 01:00,45.5\n2006-06-11 02:00\n");
        let data = read_data_file(file.path()).unwrap();

        assert_eq!(data.headers, vec!["DATETIME", "LAT"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0], vec!["2006-06-11 01:00", "45.5"]);
        assert_eq!(data.rows[1], vec!["2006-06-11 02:00"]);
    }

    #[test]
    fn test_missing_input_columns() {
        let spec_file = write_temp(SPEC);
        let spec = load_column_spec(spec_file.path()).unwrap();
        let data_file = write_temp("DATETIME,LON\n2006-06-11 01:00,-30\n");
        let data = read_data_file(data_file.path()).unwrap();

        assert_eq!(data.missing_input_columns(&spec), vec!["LAT".to_string()]);
    }

    #[test]
    fn test_read_data_rows_missing_file() {
        let err = read_data_rows(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, Error::CsvParsing { .. }));
    }

    #[test]
    fn test_read_event_log_file() {
        let file = write_temp("flag,epoch_seconds,region\nN,1262304000,G\nA, 1262390400 ,N\n,1262476800,\n");
        let entries = read_event_log_file(file.path()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], QcLogEntry::new("N", 1_262_304_000, "G"));
        assert_eq!(entries[1], QcLogEntry::new("A", 1_262_390_400, "N"));
        assert_eq!(entries[2], QcLogEntry::new("", 1_262_476_800, ""));
    }

    #[test]
    fn test_read_event_log_file_with_reviewer_columns() {
        let file = write_temp(
            "flag,epoch_seconds,region,username,realname,comment,dataset_id,version\n\
             A,1262304000,G,jdoe,J. Doe,Accepted,33RO20060611,2.0\n",
        );
        let entries = read_event_log_file(file.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "jdoe");
        assert_eq!(entries[0].realname, "J. Doe");
        assert_eq!(entries[0].comment, "Accepted");
        assert_eq!(entries[0].dataset_id, "33RO20060611");
        assert_eq!(entries[0].version, "2.0");
    }

    #[test]
    fn test_read_event_log_file_bad_time() {
        let file = write_temp("flag,epoch_seconds,region\nN,yesterday,G\n");
        let err = read_event_log_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid QC event log entry 1"));
    }
}
