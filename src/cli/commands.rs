//! Command implementations for the cruise QC CLI
//!
//! This module contains the command execution logic, result reporting and
//! logging setup for the CLI interface.

use crate::app::adapters::filesystem::{
    load_column_spec, read_data_file, read_event_log_file,
};
use crate::app::models::{Finding, QcFlag, WoceEvent};
use crate::app::services::qc_reconciler::{read_event_log, reconcile_qc_flag};
use crate::app::services::record_checker::{CheckSummary, RecordChecker};
use crate::app::services::woce_aggregator::WoceEventAggregator;
use crate::cli::args::{Args, CheckArgs, Commands, OutputFormat, QcFlagArgs, Verbosity};
use crate::{Error, Result};
use colored::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Results of checking one data file
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub dataset_id: String,
    pub version: String,
    pub summary: CheckSummary,
    pub findings: Vec<Finding>,
    pub events: Vec<WoceEvent>,
}

/// Reconciled dataset QC flag of one event log
#[derive(Debug, Clone, Serialize)]
pub struct QcFlagOutcome {
    pub flag: QcFlag,
    pub status: String,
    /// Entries that took part in the reconciliation
    pub events_read: usize,
    /// Entries skipped as comments, renames or without region
    pub entries_skipped: usize,
}

/// Main command runner
///
/// Sets up logging, runs the selected subcommand and prints its results in
/// the requested format.
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args.verbosity())?;
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Some(Commands::Check(check)) => {
            let outcome = check_file(check)?;
            match check.output_format {
                OutputFormat::Json => print_json(&outcome),
                OutputFormat::Summary => {
                    print_check_summary(&outcome);
                    Ok(())
                }
            }
        }
        Some(Commands::QcFlag(qc)) => {
            let outcome = reconcile_event_log(qc)?;
            match qc.output_format {
                OutputFormat::Json => print_json(&outcome),
                OutputFormat::Summary => {
                    print_qc_flag_summary(&outcome);
                    Ok(())
                }
            }
        }
        None => Ok(()),
    }
}

/// Check a data file and aggregate its WOCE flag events
pub fn check_file(args: &CheckArgs) -> Result<CheckOutcome> {
    args.validate()?;
    let config = args.checker_config()?;
    debug!("Checker configuration: {:?}", config);

    let spec = load_column_spec(&args.spec_file)?;
    let data = read_data_file(&args.data_file)?;
    let missing = data.missing_input_columns(&spec);
    if !missing.is_empty() {
        warn!(
            "Data file {} lacks input columns: {}",
            args.data_file.display(),
            missing.join(", ")
        );
    }

    let checker = RecordChecker::new(spec, config.date_grammar()?, config.reference_time)?
        .with_time_variable(config.time_variable.clone());
    let report = checker.check_rows(&data.rows)?;

    let dataset_id = args.dataset_id();
    let stamp = config.event_stamp(dataset_id.clone(), args.version_label.clone());
    let columns = checker.spec().column_variables(checker.time_variable());
    let reviewer = args.reviewer_flags()?;
    let events = WoceEventAggregator::new(&columns, &report, &stamp)
        .aggregate(&report.findings, &reviewer)?;

    info!("{}: {} WOCE events", dataset_id, events.len());
    Ok(CheckOutcome {
        dataset_id,
        version: args.version_label.clone(),
        summary: report.summary,
        findings: report.findings,
        events,
    })
}

/// Reconcile the dataset QC flag of an event log file
pub fn reconcile_event_log(args: &QcFlagArgs) -> Result<QcFlagOutcome> {
    args.validate()?;
    let entries = read_event_log_file(&args.events_file)?;
    let events = read_event_log(&entries)?;
    let flag = reconcile_qc_flag(&events);

    info!(
        "Reconciled QC flag {} from {} events",
        flag,
        events.len()
    );
    Ok(QcFlagOutcome {
        flag,
        status: flag.status().to_string(),
        events_read: events.len(),
        entries_skipped: entries.len().saturating_sub(events.len()),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::serialization("Failed to encode results as JSON", e))?;
    println!("{}", text);
    Ok(())
}

fn print_check_summary(outcome: &CheckOutcome) {
    println!(
        "\n{} {}",
        "Check Summary".bright_green().bold(),
        outcome.dataset_id.bright_white()
    );
    println!(
        "  {} {}",
        "Rows checked:".bright_cyan(),
        outcome.summary.rows_checked.to_string().bright_white()
    );
    if outcome.summary.rows_with_errors > 0 {
        println!(
            "  {} {}",
            "Rows with errors:".bright_red(),
            outcome.summary.rows_with_errors.to_string().bright_red().bold()
        );
    }
    if outcome.summary.rows_with_warnings > 0 {
        println!(
            "  {} {}",
            "Rows with warnings:".bright_yellow(),
            outcome.summary.rows_with_warnings.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "WOCE events:".bright_cyan(),
        outcome.events.len().to_string().bright_white().bold()
    );

    for event in &outcome.events {
        let rows: Vec<String> = event.row_numbers().iter().map(|r| r.to_string()).collect();
        println!(
            "    {} {} {} rows {}",
            format!("WOCE-{}", event.flag).bright_yellow(),
            event.variable_name.as_deref().unwrap_or("-").bright_white(),
            event.comment,
            rows.join(",")
        );
    }
}

fn print_qc_flag_summary(outcome: &QcFlagOutcome) {
    println!("\n{}", "Dataset QC Flag".bright_green().bold());
    println!(
        "  {} {} ({})",
        "Flag:".bright_cyan(),
        outcome.flag.to_string().bright_white().bold(),
        outcome.status
    );
    println!(
        "  {} {} read, {} skipped",
        "Events:".bright_cyan(),
        outcome.events_read.to_string().bright_white(),
        outcome.entries_skipped
    );
}

/// Set up structured logging based on verbosity flags
fn setup_logging(verbosity: &Verbosity) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = verbosity.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cruise_qc={}", log_level)));

    if verbosity.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
