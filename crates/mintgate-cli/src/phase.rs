//! # Phase Subcommand
//!
//! Shows which phase a sale config is in at a given instant (default: now)
//! and when each phase opens.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use mintgate_core::Timestamp;
use mintgate_state::{Phase, SaleConfig};

/// Arguments for the `mintgate phase` subcommand.
#[derive(Args, Debug)]
pub struct PhaseArgs {
    /// Sale config file (YAML, or JSON by extension).
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Instant to evaluate, RFC 3339. Defaults to now.
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PhaseReport {
    at: Timestamp,
    phase: Phase,
    step: u8,
    opens: Vec<(Phase, Option<Timestamp>)>,
}

/// Execute the phase subcommand.
pub fn run_phase(args: &PhaseArgs) -> Result<u8> {
    let config = crate::load_sale_config(&args.config)?;
    let at = match &args.at {
        Some(s) => Timestamp::parse_lenient(s).context("invalid --at timestamp")?,
        None => Timestamp::now(),
    };
    let report = report(&config, at);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("at:    {}", report.at);
        println!("phase: {} ({})", report.phase, report.step);
        for (phase, opens) in &report.opens {
            let marker = if *phase == report.phase { "*" } else { " " };
            match opens {
                Some(ts) => println!("  {marker} {phase:<15} opens {ts}"),
                None => println!("  {marker} {phase:<15} opens (out of range)"),
            }
        }
    }
    Ok(0)
}

fn report(config: &SaleConfig, at: Timestamp) -> PhaseReport {
    let phase = config.schedule.phase_at(config.sale_start_time, at);
    let boundaries = config.schedule.boundaries(config.sale_start_time);
    let opens = Phase::ALL[1..]
        .iter()
        .map(|p| (*p, boundaries.start_timestamp(*p)))
        .collect();
    PhaseReport {
        at,
        phase,
        step: phase.ordinal(),
        opens,
    }
}
