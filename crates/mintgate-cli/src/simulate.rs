//! # Simulate Subcommand
//!
//! Replays a scripted sale against an in-memory engine: a config, an
//! allow-list, and a list of timed calls. Each call prints `OK` or the
//! rejection code, and the final state and metrics are printed as JSON.
//!
//! ```yaml
//! config:
//!   sale_start_time: 2026-01-01T00:00:00Z
//!   base_uri: ipfs://CID/
//! admin: "0x00000000000000000000000000000000000000ad"
//! beneficiary: "0x00000000000000000000000000000000000000be"
//! allowlist:
//!   - "0x1111111111111111111111111111111111111111"
//! steps:
//!   - at: 2026-01-01T00:00:01Z
//!     op: whitelist_mint
//!     identity: "0x1111111111111111111111111111111111111111"
//!     quantity: 1
//!     payment: 2000000000000000
//! ```
//!
//! Allow-list proofs are generated from `allowlist`; a non-member is sent
//! with an empty proof.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use mintgate_core::{Amount, AssetId, Identity, Timestamp};
use mintgate_crypto::{Commitment, MembershipProof, MembershipTree};
use mintgate_engine::{
    EngineState, InMemoryRegistry, LedgerRail, ManualClock, MetricsSnapshot, SaleEngine,
    SaleError,
};
use mintgate_state::SaleConfig;

/// Arguments for the `mintgate simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Simulation script (YAML, or JSON by extension).
    #[arg(value_name = "FILE")]
    pub script: PathBuf,

    /// Exit 1 if any step is rejected.
    #[arg(long)]
    pub strict: bool,
}

/// A scripted sale.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub config: SaleConfig,
    pub admin: Identity,
    pub beneficiary: Identity,
    pub allowlist: Vec<Identity>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One timed call.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at: Timestamp,
    #[serde(flatten)]
    pub call: Call,
}

/// Engine calls available to a script. Admin calls default to the
/// script's `admin` when `caller` is omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    WhitelistMint {
        identity: Identity,
        quantity: u64,
        payment: Amount,
    },
    PublicMint {
        identity: Identity,
        quantity: u64,
        payment: Amount,
    },
    Gift {
        caller: Option<Identity>,
        recipient: Identity,
        quantity: u64,
    },
    SetSaleStartTime {
        caller: Option<Identity>,
        start: Timestamp,
    },
    /// Rotate the commitment. Proofs are still generated from the
    /// script's `allowlist`, so they stop verifying after a rotation.
    SetMerkleRoot {
        caller: Option<Identity>,
        root: Commitment,
    },
    SetBaseUri {
        caller: Option<Identity>,
        base_uri: String,
    },
    SetPause {
        caller: Option<Identity>,
        paused: bool,
    },
    ReleaseAll {
        caller: Option<Identity>,
    },
}

impl Call {
    fn name(&self) -> &'static str {
        match self {
            Self::WhitelistMint { .. } => "whitelist_mint",
            Self::PublicMint { .. } => "public_mint",
            Self::Gift { .. } => "gift",
            Self::SetSaleStartTime { .. } => "set_sale_start_time",
            Self::SetMerkleRoot { .. } => "set_merkle_root",
            Self::SetBaseUri { .. } => "set_base_uri",
            Self::SetPause { .. } => "set_pause",
            Self::ReleaseAll { .. } => "release_all",
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub at: Timestamp,
    /// Assets issued by the step, if any.
    pub asset_ids: Vec<AssetId>,
    /// Rejection code, `None` on success.
    pub rejected: Option<&'static str>,
    pub detail: Option<String>,
}

/// Everything a simulation produced.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub outcomes: Vec<StepOutcome>,
    pub state: EngineState,
    pub metrics: MetricsSnapshot,
}

impl SimulationReport {
    pub fn rejections(&self) -> usize {
        self.outcomes.iter().filter(|o| o.rejected.is_some()).count()
    }
}

/// Execute the simulate subcommand.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let script: Script = crate::load_document(&args.script)?;
    let report = simulate(script)?;

    for o in &report.outcomes {
        match o.rejected {
            None => println!("#{:<3} {} {:<20} OK {:?}", o.index, o.at, o.op, o.asset_ids),
            Some(code) => println!(
                "#{:<3} {} {:<20} REJECTED {code}: {}",
                o.index,
                o.at,
                o.op,
                o.detail.as_deref().unwrap_or("")
            ),
        }
    }
    println!("{}", serde_json::to_string_pretty(&report.state)?);
    println!("{}", serde_json::to_string_pretty(&report.metrics)?);

    if args.strict && report.rejections() > 0 {
        return Ok(1);
    }
    Ok(0)
}

/// Run a script to completion. Rejections are recorded, not fatal.
pub fn simulate(script: Script) -> Result<SimulationReport> {
    let tree = MembershipTree::build(script.allowlist.iter().copied())
        .context("allowlist must contain at least one identity")?;
    let admin = script.admin;
    let state = EngineState::new(script.config, tree.commitment(), admin, script.beneficiary)
        .context("invalid sale config")?;
    let first = script.steps.first().map_or_else(Timestamp::now, |s| s.at);
    let clock = Arc::new(ManualClock::new(first));
    let engine = SaleEngine::new(
        state,
        InMemoryRegistry::new(),
        LedgerRail::new(),
        Arc::clone(&clock),
    )?;

    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        clock.set(step.at);
        let op = step.call.name();
        let result: Result<Vec<AssetId>, SaleError> = match step.call {
            Call::WhitelistMint {
                identity,
                quantity,
                payment,
            } => {
                let proof = tree.proof(&identity).unwrap_or_else(MembershipProof::empty);
                engine
                    .whitelist_mint(identity, quantity, &proof, payment)
                    .map(|r| r.asset_ids)
            }
            Call::PublicMint {
                identity,
                quantity,
                payment,
            } => engine
                .public_mint(identity, quantity, payment)
                .map(|r| r.asset_ids),
            Call::Gift {
                caller,
                recipient,
                quantity,
            } => engine
                .gift(caller.unwrap_or(admin), recipient, quantity)
                .map(|r| r.asset_ids),
            Call::SetSaleStartTime { caller, start } => engine
                .set_sale_start_time(caller.unwrap_or(admin), start)
                .map(|()| Vec::new()),
            Call::SetMerkleRoot { caller, root } => engine
                .set_merkle_root(caller.unwrap_or(admin), root)
                .map(|()| Vec::new()),
            Call::SetBaseUri { caller, base_uri } => engine
                .set_base_uri(caller.unwrap_or(admin), base_uri)
                .map(|()| Vec::new()),
            Call::SetPause { caller, paused } => engine
                .set_pause(caller.unwrap_or(admin), paused)
                .map(|()| Vec::new()),
            Call::ReleaseAll { caller } => engine
                .release_all(caller.unwrap_or(admin))
                .map(|_| Vec::new()),
        };
        let outcome = match result {
            Ok(asset_ids) => StepOutcome {
                index,
                op,
                at: step.at,
                asset_ids,
                rejected: None,
                detail: None,
            },
            Err(e) => StepOutcome {
                index,
                op,
                at: step.at,
                asset_ids: Vec::new(),
                rejected: Some(e.code()),
                detail: Some(e.to_string()),
            },
        };
        tracing::debug!(index, op, rejected = ?outcome.rejected, "step replayed");
        outcomes.push(outcome);
    }

    Ok(SimulationReport {
        outcomes,
        state: engine.snapshot(),
        metrics: engine.metrics(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
config:
  sale_start_time: 2026-01-01T00:00:00Z
  base_uri: ipfs://CID/
admin: "0x00000000000000000000000000000000000000ad"
beneficiary: "0x00000000000000000000000000000000000000be"
allowlist:
  - "0x1111111111111111111111111111111111111111"
  - "0x2222222222222222222222222222222222222222"
steps:
  - at: 2025-12-31T23:59:59Z
    op: whitelist_mint
    identity: "0x1111111111111111111111111111111111111111"
    quantity: 1
    payment: 2000000000000000
  - at: 2026-01-01T00:00:01Z
    op: whitelist_mint
    identity: "0x1111111111111111111111111111111111111111"
    quantity: 1
    payment: 2000000000000000
  - at: 2026-01-01T00:00:02Z
    op: whitelist_mint
    identity: "0x3333333333333333333333333333333333333333"
    quantity: 1
    payment: 2000000000000000
  - at: 2026-01-02T01:00:00Z
    op: public_mint
    identity: "0x3333333333333333333333333333333333333333"
    quantity: 3
    payment: 9000000000000000
  - at: 2026-01-03T01:00:00Z
    op: gift
    recipient: "0x4444444444444444444444444444444444444444"
    quantity: 2
  - at: 2026-01-03T01:00:01Z
    op: release_all
"#;

    fn script() -> Script {
        serde_yaml::from_str(SCRIPT).unwrap()
    }

    #[test]
    fn script_replays_in_order() {
        let report = simulate(script()).unwrap();
        let codes: Vec<Option<&str>> = report.outcomes.iter().map(|o| o.rejected).collect();
        assert_eq!(
            codes,
            vec![
                Some("WhitelistSaleNotActivated"),
                None,
                Some("NotWhitelisted"),
                None,
                None,
                None,
            ]
        );
        assert_eq!(report.outcomes[1].asset_ids, vec![AssetId(1)]);
        assert_eq!(report.state.quota.issued(), 6);
        assert!(report.state.settlement.custodied().is_zero());
        assert_eq!(
            report.state.settlement.total_released(),
            Amount(11_000_000_000_000_000)
        );
        assert_eq!(report.rejections(), 2);
    }

    #[test]
    fn strict_mode_fails_on_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.yaml");
        std::fs::write(&path, SCRIPT).unwrap();
        let lenient = SimulateArgs {
            script: path.clone(),
            strict: false,
        };
        let strict = SimulateArgs {
            script: path,
            strict: true,
        };
        assert_eq!(run_simulate(&lenient).unwrap(), 0);
        assert_eq!(run_simulate(&strict).unwrap(), 1);
    }

    #[test]
    fn merkle_root_rotation_invalidates_script_proofs() {
        let other = MembershipTree::build([Identity::from_bytes([0x99; 20])]).unwrap();
        let yaml = format!(
            r#"
config:
  sale_start_time: 2026-01-01T00:00:00Z
  base_uri: ipfs://CID/
admin: "0x00000000000000000000000000000000000000ad"
beneficiary: "0x00000000000000000000000000000000000000be"
allowlist:
  - "0x1111111111111111111111111111111111111111"
  - "0x2222222222222222222222222222222222222222"
steps:
  - at: 2026-01-01T00:00:01Z
    op: set_merkle_root
    caller: "0x1111111111111111111111111111111111111111"
    root: "{root}"
  - at: 2026-01-01T00:00:02Z
    op: set_merkle_root
    root: "{root}"
  - at: 2026-01-01T00:00:03Z
    op: whitelist_mint
    identity: "0x1111111111111111111111111111111111111111"
    quantity: 1
    payment: 2000000000000000
"#,
            root = other.commitment().to_hex()
        );
        let script: Script = serde_yaml::from_str(&yaml).unwrap();
        let report = simulate(script).unwrap();
        let codes: Vec<Option<&str>> = report.outcomes.iter().map(|o| o.rejected).collect();
        assert_eq!(codes, vec![Some("Unauthorized"), None, Some("NotWhitelisted")]);
        assert_eq!(report.outcomes[1].op, "set_merkle_root");
        assert_eq!(report.state.commitment, other.commitment());
    }

    #[test]
    fn demo_script_replays() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos/simulation.yaml");
        let script: Script = crate::load_document(&path).unwrap();
        let report = simulate(script).unwrap();
        let codes: Vec<Option<&str>> = report.outcomes.iter().map(|o| o.rejected).collect();
        assert_eq!(
            codes,
            vec![
                Some("WhitelistSaleNotActivated"),
                None,
                None,
                Some("MaxSupplyExceeded"),
                None,
                None,
                None,
                None,
                None,
            ]
        );
        assert_eq!(report.state.quota.issued(), 10);
        assert!(report.state.config.paused);
        assert_eq!(
            report.state.settlement.total_released(),
            Amount(22_000_000_000_000_000)
        );
    }

    #[test]
    fn empty_allowlist_is_an_error() {
        let mut s = script();
        s.allowlist.clear();
        assert!(simulate(s).is_err());
    }
}
