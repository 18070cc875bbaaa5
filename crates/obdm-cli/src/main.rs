//! # obdm CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use obdm_cli::extract::{run_extract, ExtractArgs};
use obdm_cli::matrix::{run_matrix, MatrixArgs};

/// Signalset matrix toolchain.
///
/// Flattens per-vehicle signalset definitions into a single parameter
/// record collection and pivots it into the coverage matrix rendered by
/// the explorer site.
#[derive(Parser, Debug)]
#[command(name = "obdm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten workspace signalsets into `matrix_data.json`.
    Extract(ExtractArgs),

    /// Pivot the flat records into the canonical `matrix.json`.
    Matrix(MatrixArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Extract(args) => run_extract(&args),
        Commands::Matrix(args) => run_matrix(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
