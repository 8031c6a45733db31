mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::schedule::{BuildArgs, LendersArgs};
use commands::validation::ValidateDatesArgs;

/// Loan amortization timetables with decimal precision
#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Loan amortization timetables with decimal precision",
    long_about = "A CLI for building loan amortization timetables (standard annuity, \
                  linear, bullet, in-fine and uncapitalized bullet), splitting a loan \
                  between lenders and checking explicit term dates."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the timetable of a loan
    Build(BuildArgs),
    /// Build lender timetables of a shared loan and the borrower timetable
    Lenders(LendersArgs),
    /// Check an explicit list of term dates
    ValidateDates(ValidateDatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Build(args) => commands::schedule::run_build(args),
        Commands::Lenders(args) => commands::schedule::run_lenders(args),
        Commands::ValidateDates(args) => commands::validation::run_validate_dates(args),
        Commands::Version => {
            println!("timetable {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
