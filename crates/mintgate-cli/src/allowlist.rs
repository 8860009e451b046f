//! # Allowlist Subcommand
//!
//! Offline allow-list tooling: compute the commitment the administrator
//! publishes, hand each member their proof, and check a proof the way the
//! engine will.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use mintgate_core::Identity;
use mintgate_crypto::{verify, Commitment, MembershipProof, MembershipTree};

/// Arguments for the `mintgate allowlist` subcommand.
#[derive(Args, Debug)]
pub struct AllowlistArgs {
    #[command(subcommand)]
    pub command: AllowlistCommand,
}

/// Allowlist subcommands.
#[derive(Subcommand, Debug)]
pub enum AllowlistCommand {
    /// Print the commitment for an identity list.
    Root {
        /// One identity per line; blank lines and `#` comments ignored.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the membership proof for one identity as a JSON array.
    Proof {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "IDENTITY")]
        identity: String,
    },

    /// Check a proof against a commitment.
    Verify {
        /// Commitment, 0x-prefixed hex.
        #[arg(long)]
        root: String,
        #[arg(long)]
        identity: String,
        /// Sibling digests, lowest level first. Repeat for each level.
        #[arg(long = "proof", value_name = "HEX")]
        proof: Vec<String>,
    },
}

/// Execute the allowlist subcommand.
pub fn run_allowlist(args: &AllowlistArgs) -> Result<u8> {
    match &args.command {
        AllowlistCommand::Root { file } => cmd_root(file),
        AllowlistCommand::Proof { file, identity } => cmd_proof(file, identity),
        AllowlistCommand::Verify {
            root,
            identity,
            proof,
        } => cmd_verify(root, identity, proof),
    }
}

fn build_tree(file: &Path) -> Result<MembershipTree> {
    let identities = crate::read_identity_list(file)?;
    let count = identities.len();
    let tree = MembershipTree::build(identities)
        .with_context(|| format!("failed to build allow-list from {}", file.display()))?;
    tracing::info!(
        listed = count,
        members = tree.len(),
        depth = tree.depth(),
        "allow-list built"
    );
    Ok(tree)
}

fn cmd_root(file: &Path) -> Result<u8> {
    let tree = build_tree(file)?;
    println!("{}", tree.commitment());
    Ok(0)
}

fn cmd_proof(file: &Path, identity: &str) -> Result<u8> {
    let identity = Identity::from_hex(identity).context("invalid identity")?;
    let tree = build_tree(file)?;
    match tree.proof(&identity) {
        Some(proof) => {
            println!("{}", serde_json::to_string_pretty(&proof.to_hex_strings())?);
            Ok(0)
        }
        None => {
            println!("NOT A MEMBER: {identity}");
            Ok(1)
        }
    }
}

fn cmd_verify(root: &str, identity: &str, proof: &[String]) -> Result<u8> {
    let commitment = Commitment::from_hex(root).context("invalid root")?;
    let identity = Identity::from_hex(identity).context("invalid identity")?;
    let proof = MembershipProof::from_hex_strs(proof).context("invalid proof")?;
    if verify(&identity, &proof, &commitment) {
        println!("VALID");
        Ok(0)
    } else {
        println!("INVALID");
        Ok(1)
    }
}
