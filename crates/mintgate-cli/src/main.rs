//! # mintgate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintgate_cli::allowlist::{run_allowlist, AllowlistArgs};
use mintgate_cli::config::{run_config, ConfigArgs};
use mintgate_cli::phase::{run_phase, PhaseArgs};
use mintgate_cli::simulate::{run_simulate, SimulateArgs};

/// mintgate: time-phased allow-list sale tooling.
///
/// Builds allow-list commitments and proofs offline, inspects sale phases,
/// validates sale configs, and replays scripted sales.
#[derive(Parser, Debug)]
#[command(name = "mintgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Allow-list commitment, proofs, and proof verification.
    Allowlist(AllowlistArgs),

    /// Show the sale phase and phase boundaries for a config.
    Phase(PhaseArgs),

    /// Validate a sale config.
    Config(ConfigArgs),

    /// Replay a scripted sale against an in-memory engine.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so command output stays machine-readable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "mintgate CLI starting");

    let result = match cli.command {
        Commands::Allowlist(args) => run_allowlist(&args),
        Commands::Phase(args) => run_phase(&args),
        Commands::Config(args) => run_config(&args),
        Commands::Simulate(args) => run_simulate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
