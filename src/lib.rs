//! Cruise QC Library
//!
//! Quality-control core for oceanographic cruise measurement files.
//!
//! This library provides tools for:
//! - Loading a declarative column specification that maps logical output fields
//!   onto input-file columns, including the active date/time layout
//! - Resolving the seven supported date/time column layouts into UTC timestamps
//! - Tracking monotonic WOCE quality flags on each field of a data record
//! - Reconciling the dataset-level QC flag from a per-region event log
//! - Aggregating row-level findings and reviewer flags into WOCE flag events
//!
//! The core is synchronous and free of I/O; file adapters and the command-line
//! front end live in [`app::adapters`] and [`cli`].

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod column_spec;
        pub mod datetime_resolver;
        pub mod qc_reconciler;
        pub mod record_checker;
        pub mod woce_aggregator;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{QcFlag, RegionId, WoceEvent, WoceFlag};
pub use app::services::column_spec::ColumnSpecification;
pub use config::CheckerConfig;

/// Result type alias for cruise QC operations
pub type Result<T> = std::result::Result<T, Error>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Error types for cruise QC operations
///
/// Per-record date/time failures are not represented here: they are
/// recoverable and use [`app::services::datetime_resolver::DateTimeError`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Column specification or other declarative configuration is malformed
    #[error("Configuration error in '{source_id}': {message}")]
    Configuration {
        source_id: String,
        message: String,
        #[source]
        cause: Option<BoxedCause>,
    },

    /// A flag was set on a field that cannot carry one
    #[error("Flag set on field '{field}': {message}")]
    Programmer { field: String, message: String },

    /// QC event log contains an entry that cannot be interpreted
    #[error("QC event log error: {message}")]
    EventLog { message: String },

    /// WOCE event aggregation could not locate its row data
    #[error("WOCE event aggregation error: {message}")]
    Aggregation { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Output serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: BoxedCause,
    },
}

impl Error {
    /// Create a configuration error without an underlying cause
    pub fn configuration(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            source_id: source_id.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Create a configuration error wrapping the error that triggered it
    pub fn configuration_with_cause(
        source_id: impl Into<String>,
        message: impl Into<String>,
        cause: impl Into<BoxedCause>,
    ) -> Self {
        Self::Configuration {
            source_id: source_id.into(),
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Create a programmer error for a misused field
    pub fn programmer(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Programmer {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an event log error
    pub fn event_log(message: impl Into<String>) -> Self {
        Self::EventLog {
            message: message.into(),
        }
    }

    /// Create an aggregation error
    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::Serialization {
            message: message.into(),
            source: source.into(),
        }
    }

    /// True for errors that indicate a bug in the calling code
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::Programmer { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: Box::new(error),
        }
    }
}
