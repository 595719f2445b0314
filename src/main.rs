use anyhow::Context;
use clap::Parser;
use cruise_qc::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let command = match &args.command {
        Some(cruise_qc::cli::args::Commands::Check(_)) => "check",
        _ => "qc-flag",
    };
    commands::run(args).with_context(|| format!("{} failed", command))
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Cruise QC - Oceanographic Cruise Data Quality Control");
    println!("=====================================================");
    println!();
    println!("Check cruise measurement files against their column mapping and");
    println!("reconcile dataset QC flags from QC event logs.");
    println!();
    println!("USAGE:");
    println!("    cruise-qc <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    check       Check a data file and report WOCE flag events");
    println!("    qc-flag     Reconcile the dataset QC flag from a QC event log");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Check a cruise file:");
    println!("    cruise-qc check --spec cruise.toml --data 33RO20060611.csv");
    println!();
    println!("    # Check with a fixed clock and reviewer flags, as JSON:");
    println!("    cruise-qc check -s cruise.toml -d 33RO20060611.csv \\");
    println!("                    --reference-time 2024-01-01T00:00:00Z --flag-bad 12,13 --format json");
    println!();
    println!("    # Reconcile the dataset QC flag:");
    println!("    cruise-qc qc-flag --events qc_events.csv");
    println!();
    println!("For detailed help on any command, use:");
    println!("    cruise-qc <COMMAND> --help");
}
