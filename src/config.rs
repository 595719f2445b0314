//! Configuration management and validation.
//!
//! Provides the settings of a checking run: the date grammar for single and
//! date + time layouts, the clock deciding which dates lie in the future, the
//! variable name of the resolved timestamp and the identity stamped on WOCE
//! events raised by the checker.

use crate::app::models::EventStamp;
use crate::app::services::datetime_resolver::{DateFormat, ReferenceTime};
use crate::constants::{
    CHECKER_REALNAME, CHECKER_USERNAME, DEFAULT_DATE_PATTERN, DEFAULT_TIME_VARIABLE,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Global configuration for record checking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Date pattern such as `YYYY-MM-DD` or `MM/DD/YY`
    pub date_format: String,

    /// Clock used to reject future dates
    pub reference_time: ReferenceTime,

    /// Variable name carried by every date/time input column
    pub time_variable: String,

    /// Username stamped on checker events
    pub username: String,

    /// Real name stamped on checker events
    pub realname: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_PATTERN.to_string(),
            reference_time: ReferenceTime::WallClock,
            time_variable: DEFAULT_TIME_VARIABLE.to_string(),
            username: CHECKER_USERNAME.to_string(),
            realname: CHECKER_REALNAME.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let source_id = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read configuration {}", source_id), e)
        })?;
        let config: CheckerConfig = toml::from_str(&text).map_err(|e| {
            Error::configuration_with_cause(&source_id, "Invalid checker configuration", e)
        })?;
        config.validate(&source_id)?;
        debug!("Loaded checker configuration from {}", source_id);
        Ok(config)
    }

    /// Set the date pattern
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// Judge future dates against a fixed instant instead of the wall clock
    pub fn with_reference_time(mut self, instant: DateTime<Utc>) -> Self {
        self.reference_time = ReferenceTime::Fixed(instant);
        self
    }

    pub fn with_time_variable(mut self, name: impl Into<String>) -> Self {
        self.time_variable = name.into();
        self
    }

    /// Set the identity stamped on checker events
    pub fn with_checker_identity(
        mut self,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.realname = realname.into();
        self
    }

    /// Check the settings that can be wrong on their own
    pub fn validate(&self, source_id: &str) -> Result<()> {
        self.date_grammar()?;
        if self.time_variable.trim().is_empty() {
            return Err(Error::configuration(source_id, "Time variable name is empty"));
        }
        Ok(())
    }

    /// Grammar for the configured date pattern
    pub fn date_grammar(&self) -> Result<DateFormat> {
        DateFormat::new(&self.date_format)
    }

    /// Event stamp for one dataset version, dated by the reference clock
    pub fn event_stamp(&self, dataset_id: impl Into<String>, version: impl Into<String>) -> EventStamp {
        EventStamp {
            dataset_id: dataset_id.into(),
            version: version.into(),
            flag_date: self.reference_time.now(),
            username: self.username.clone(),
            realname: self.realname.clone(),
        }
    }
}
