//! # Config Subcommand
//!
//! Validates a sale config file and prints the effective config with every
//! default filled in.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

/// Arguments for the `mintgate config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a sale config and print it with defaults applied.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs) -> Result<u8> {
    match &args.command {
        ConfigCommand::Check { file } => {
            let config = crate::load_sale_config(file)?;
            match config.validate() {
                Ok(()) => {
                    println!("OK: {}", file.display());
                    println!("{}", serde_yaml::to_string(&config)?);
                    Ok(0)
                }
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "sale config rejected");
                    println!("INVALID: {e}");
                    Ok(1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(contents: &str) -> Result<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sale.yaml");
        std::fs::write(&path, contents).unwrap();
        run_config(&ConfigArgs {
            command: ConfigCommand::Check { file: path },
        })
    }

    #[test]
    fn valid_config_exits_zero() {
        let code = check(
            "sale_start_time: 2026-01-01T00:00:00Z\n\
             base_uri: ipfs://CID/\n\
             limits:\n  max_total_supply: 100\n",
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn cap_violation_exits_one() {
        let code = check(
            "sale_start_time: 2026-01-01T00:00:00Z\n\
             base_uri: ipfs://CID/\n\
             limits:\n  max_sale_supply: 50\n",
        )
        .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn unparseable_config_is_an_error() {
        assert!(check("base_uri: [unterminated").is_err());
        assert!(check("base_uri: ipfs://CID/\n").is_err());
    }
}
