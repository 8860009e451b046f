//! # mintgate-cli: Sale Operator CLI
//!
//! Provides the `mintgate` command-line interface for the people running a
//! sale. The engine itself never builds allow-lists; this is where that
//! happens.
//!
//! ## Subcommands
//!
//! - `mintgate allowlist root|proof|verify`: offline commitment and proofs.
//! - `mintgate phase`: current phase and every boundary for a config.
//! - `mintgate config check`: validate a sale config file.
//! - `mintgate simulate`: replay a scripted sale against an in-memory engine.
//!
//! ## Exit codes
//!
//! Handlers return `anyhow::Result<u8>`: `0` success, `1` a negative answer
//! (invalid proof, invalid config, non-member), and any `Err` is reported by
//! `main` and exits `1`.
//!
//! ```bash
//! mintgate allowlist root allowlist.txt
//! mintgate allowlist proof allowlist.txt 0x70997970c51812dc3a010c7d01b50e0d17dc79c8
//! mintgate phase --config sale.yaml --at 2026-01-02T00:00:00Z
//! ```

pub mod allowlist;
pub mod config;
pub mod phase;
pub mod simulate;

use std::path::Path;

use anyhow::{bail, Context, Result};

use mintgate_core::Identity;
use mintgate_state::SaleConfig;

/// Read an identity list: one identity per line, blank lines and `#`
/// comments ignored.
pub fn read_identity_list(path: &Path) -> Result<Vec<Identity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read identity list: {}", path.display()))?;
    parse_identity_list(&content)
        .with_context(|| format!("invalid identity list: {}", path.display()))
}

/// Parse the text form of an identity list.
pub fn parse_identity_list(content: &str) -> Result<Vec<Identity>> {
    let mut identities = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let identity = Identity::from_hex(line)
            .with_context(|| format!("line {}: {line:?}", index + 1))?;
        identities.push(identity);
    }
    if identities.is_empty() {
        bail!("no identities found");
    }
    Ok(identities)
}

/// Parse a YAML or JSON document, chosen by file extension.
pub fn load_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))
    }
}

/// Load a sale config without validating it.
pub fn load_sale_config(path: &Path) -> Result<SaleConfig> {
    load_document(path)
}
