//! Command-line argument definitions for the cruise QC tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::models::WoceFlag;
use crate::app::services::woce_aggregator::ReviewerFlags;
use crate::config::CheckerConfig;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source id used for errors in command-line values
const COMMAND_LINE: &str = "command line";

/// CLI arguments for the cruise QC tool
///
/// Checks oceanographic cruise data files against their column mapping and
/// reconciles dataset QC flags from QC event logs.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cruise-qc",
    version,
    about = "Quality control for oceanographic cruise data files",
    long_about = "Checks cruise measurement files against a declarative column mapping, \
                  resolves their date/time columns, raises WOCE flags on rows that cannot be \
                  used and reconciles the dataset-level QC flag from a per-region event log."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Check a data file and report WOCE flag events
    Check(CheckArgs),
    /// Reconcile the dataset QC flag from a QC event log
    QcFlag(QcFlagArgs),
}

/// Logging flags shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct Verbosity {
    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Verbosity {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for the check command
#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
    /// Column mapping of the data file (TOML)
    #[arg(short = 's', long = "spec", value_name = "FILE")]
    pub spec_file: PathBuf,

    /// Data file to check (CSV with a header row)
    #[arg(short = 'd', long = "data", value_name = "FILE")]
    pub data_file: PathBuf,

    /// Checker configuration file (TOML); command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Date pattern for single and date + time layouts
    #[arg(long = "date-format", value_name = "PATTERN", help = "Date pattern, e.g. YYYY-MM-DD or MM/DD/YY")]
    pub date_format: Option<String>,

    /// Judge future dates against this instant instead of the current time
    #[arg(long = "reference-time", value_name = "RFC3339")]
    pub reference_time: Option<DateTime<Utc>>,

    /// Dataset identifier stamped on events; defaults to the data file stem
    #[arg(long = "dataset-id", value_name = "ID")]
    pub dataset_id: Option<String>,

    /// Dataset version stamped on events
    #[arg(long = "version-label", value_name = "VERSION", default_value = "1.0")]
    pub version_label: String,

    /// Rows the reviewer flags questionable (1-based, comma-separated)
    #[arg(long = "flag-questionable", value_name = "ROWS")]
    pub questionable_rows: Option<RowList>,

    /// Rows the reviewer flags bad (1-based, comma-separated)
    #[arg(long = "flag-bad", value_name = "ROWS")]
    pub bad_rows: Option<RowList>,

    /// Output format for the results
    #[arg(long = "format", value_enum, default_value = "summary")]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

/// Arguments for the qc-flag command
#[derive(Debug, Clone, Parser)]
pub struct QcFlagArgs {
    /// QC event log (CSV with header flag,epoch_seconds,region)
    #[arg(short = 'e', long = "events", value_name = "FILE")]
    pub events_file: PathBuf,

    /// Output format for the results
    #[arg(long = "format", value_enum, default_value = "summary")]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// JSON for scripting
    Json,
}

/// Comma-separated list of 1-based row numbers
#[derive(Debug, Clone, PartialEq)]
pub struct RowList {
    pub rows: Vec<usize>,
}

impl FromStr for RowList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let row: usize = part
                .parse()
                .map_err(|_| Error::configuration(COMMAND_LINE, format!("Invalid row number '{}'", part)))?;
            if row == 0 {
                return Err(Error::configuration(COMMAND_LINE, "Row numbers start at 1"));
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(Error::configuration(COMMAND_LINE, "Row list cannot be empty"));
        }
        Ok(RowList { rows })
    }
}

impl Args {
    /// Logging flags of the selected subcommand
    pub fn verbosity(&self) -> Verbosity {
        match &self.command {
            Some(Commands::Check(args)) => args.verbosity.clone(),
            Some(Commands::QcFlag(args)) => args.verbosity.clone(),
            None => Verbosity::default(),
        }
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(Error::configuration(
            COMMAND_LINE,
            format!("{} does not exist: {}", what, path.display()),
        ));
    }
    Ok(())
}

impl CheckArgs {
    /// Validate the check command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        require_file(&self.spec_file, "Column specification")?;
        require_file(&self.data_file, "Data file")?;
        if let Some(config_file) = &self.config_file {
            require_file(config_file, "Config file")?;
        }
        Ok(())
    }

    /// Checker configuration: defaults, then the config file, then arguments
    pub fn checker_config(&self) -> Result<CheckerConfig> {
        let mut config = match &self.config_file {
            Some(path) => CheckerConfig::from_file(path)?,
            None => CheckerConfig::default(),
        };
        if let Some(pattern) = &self.date_format {
            config = config.with_date_format(pattern.clone());
        }
        if let Some(instant) = self.reference_time {
            config = config.with_reference_time(instant);
        }
        config.validate(COMMAND_LINE)?;
        Ok(config)
    }

    /// Dataset identifier, falling back to the data file stem
    pub fn dataset_id(&self) -> String {
        self.dataset_id.clone().unwrap_or_else(|| {
            self.data_file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    /// Reviewer flags given on the command line, with 0-based rows
    pub fn reviewer_flags(&self) -> Result<ReviewerFlags> {
        let mut flags = ReviewerFlags::new();
        let lists = [
            (WoceFlag::Questionable, &self.questionable_rows),
            (WoceFlag::Bad, &self.bad_rows),
        ];
        for (flag, list) in lists {
            for row in list.iter().flat_map(|l| l.rows.iter()) {
                flags.flag_row(flag, row - 1, None)?;
            }
        }
        Ok(flags)
    }
}

impl QcFlagArgs {
    /// Validate the qc-flag command arguments
    pub fn validate(&self) -> Result<()> {
        require_file(&self.events_file, "QC event log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn check_args(argv: &[&str]) -> CheckArgs {
        match parse(argv).command {
            Some(Commands::Check(args)) => args,
            other => panic!("expected check command, got {:?}", other),
        }
    }

    #[test]
    fn test_row_list_parsing() {
        assert_eq!(RowList::from_str("3").unwrap().rows, vec![3]);
        assert_eq!(RowList::from_str(" 3 , 7,9 ").unwrap().rows, vec![3, 7, 9]);
        assert!(RowList::from_str("").is_err());
        assert!(RowList::from_str(",,").is_err());
        assert!(RowList::from_str("0").is_err());
        assert!(RowList::from_str("two").is_err());
    }

    #[test]
    fn test_check_defaults() {
        let args = check_args(&["cruise-qc", "check", "--spec", "spec.toml", "--data", "data/33RO20060611.csv"]);
        assert_eq!(args.output_format, OutputFormat::Summary);
        assert_eq!(args.version_label, "1.0");
        assert_eq!(args.dataset_id(), "33RO20060611");
        assert_eq!(args.verbosity.get_log_level(), "warn");
        assert!(args.reviewer_flags().unwrap().is_empty());
    }

    #[test]
    fn test_log_levels() {
        let args = check_args(&["cruise-qc", "check", "-s", "a", "-d", "b", "-vv"]);
        assert_eq!(args.verbosity.get_log_level(), "debug");

        let args = check_args(&["cruise-qc", "check", "-s", "a", "-d", "b", "-q"]);
        assert_eq!(args.verbosity.get_log_level(), "error");

        assert!(Args::try_parse_from(["cruise-qc", "check", "-s", "a", "-d", "b", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_arguments_override_config() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, "date_format = \"DD/MM/YYYY\"\ntime_variable = \"TIME\"").unwrap();
        let config_path = config_file.path().to_string_lossy().into_owned();
        let config_path = config_path.as_str();

        let args = check_args(&[
            "cruise-qc",
            "check",
            "-s",
            "a",
            "-d",
            "b",
            "-c",
            config_path,
            "--date-format",
            "MM/DD/YYYY",
            "--reference-time",
            "2024-01-01T00:00:00Z",
        ]);
        let config = args.checker_config().unwrap();

        assert_eq!(config.date_format, "MM/DD/YYYY");
        assert_eq!(config.time_variable, "TIME");
        assert_eq!(
            config.event_stamp("x", "1").flag_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_reviewer_flags_are_zero_based() {
        let args = check_args(&[
            "cruise-qc",
            "check",
            "-s",
            "a",
            "-d",
            "b",
            "--flag-bad",
            "2,5",
            "--flag-questionable",
            "1",
        ]);
        let mut expected = ReviewerFlags::new();
        expected.flag_row(WoceFlag::Bad, 1, None).unwrap();
        expected.flag_row(WoceFlag::Bad, 4, None).unwrap();
        expected.flag_row(WoceFlag::Questionable, 0, None).unwrap();
        assert_eq!(args.reviewer_flags().unwrap(), expected);
    }

    #[test]
    fn test_check_validation() {
        let temp_dir = TempDir::new().unwrap();
        let spec = temp_dir.path().join("spec.toml");
        let data = temp_dir.path().join("data.csv");
        std::fs::write(&spec, "").unwrap();
        let (spec_arg, data_arg) = (
            spec.to_string_lossy().into_owned(),
            data.to_string_lossy().into_owned(),
        );

        let args = check_args(&["cruise-qc", "check", "-s", spec_arg.as_str(), "-d", data_arg.as_str()]);
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("Data file does not exist"));

        std::fs::write(&data, "").unwrap();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_qc_flag_args() {
        let args = parse(&["cruise-qc", "qc-flag", "--events", "log.csv", "--format", "json"]);
        match args.command {
            Some(Commands::QcFlag(qc)) => {
                assert_eq!(qc.output_format, OutputFormat::Json);
                assert!(qc.validate().is_err());
            }
            other => panic!("expected qc-flag command, got {:?}", other),
        }
    }
}
