mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::project::{PeriodsArgs, ProjectArgs};
use commands::sensitivity::SensitivityArgs;

/// Multi-year financial projections for facility lease proposals
#[derive(Parser)]
#[command(
    name = "lpe",
    version,
    about = "Multi-year financial projections for facility lease proposals",
    long_about = "Projects historical, transition and contract years of a lease proposal \
                  into reconciled income statements, balance sheets and cash flows with \
                  decimal precision. Reports NPV, IRR, payback and ROI, compares offers \
                  and sweeps assumptions for sensitivity."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity on stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full projection: statements, validation flags and metrics
    Project(ProjectArgs),
    /// List the year-by-year statements of a proposal
    Periods(PeriodsArgs),
    /// Rank proposals by NPV
    Compare(CompareArgs),
    /// NPV sensitivity to one or two assumptions
    Sensitivity(SensitivityArgs),
    /// Print a sample proposal to use as an input template
    Example,
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

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Periods(args) => commands::project::run_periods(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity_cmd(args),
        Commands::Example => serde_json::to_value(
            lease_projection_core::assumptions::example_input(),
        )
        .map_err(Into::into),
        Commands::Version => {
            println!("lpe {}", env!("CARGO_PKG_VERSION"));
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
