//! # Sale Engine
//!
//! Owns the [`EngineState`], the registry and the payout rail behind one
//! `parking_lot::RwLock`. Every mutating operation holds the write lock
//! from the first check until the last commit, so interleaved callers
//! always observe whole operations.
//!
//! The engine is synchronous; the lock is never held across an `.await`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use mintgate_core::{Amount, AssetId, Identity, Timestamp};
use mintgate_crypto::{Commitment, MembershipProof};
use mintgate_state::{IdentityQuota, MintKind, Phase, PhaseBoundaries, ReleaseRecord};

use crate::clock::Clock;
use crate::error::SaleError;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::rail::PayoutRail;
use crate::registry::AssetRegistry;
use crate::state::{EngineState, MintPlan};

/// Result of a successful mint or gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub kind: MintKind,
    pub recipient: Identity,
    pub asset_ids: Vec<AssetId>,
    pub phase: Phase,
    /// Amount taken into custody.
    pub paid: Amount,
    /// `quantity × price`.
    pub owed: Amount,
    /// Retained excess over `owed`.
    pub overpaid: Amount,
}

#[derive(Debug)]
struct Inner<R, P> {
    state: EngineState,
    registry: R,
    rail: P,
}

impl<R: AssetRegistry, P> Inner<R, P> {
    /// Issue the planned assets, then commit. Nothing is committed if the
    /// registry refuses.
    fn execute(&mut self, plan: MintPlan) -> Result<MintReceipt, SaleError> {
        let reservation = plan.reservation;
        let asset_ids = self
            .registry
            .mint(reservation.identity, reservation.quantity)?;
        self.state.commit(&plan);
        let (paid, owed, overpaid) = match plan.settlement {
            Some(r) => (r.paid, r.owed, r.overpaid),
            None => (Amount::ZERO, Amount::ZERO, Amount::ZERO),
        };
        Ok(MintReceipt {
            kind: reservation.kind,
            recipient: reservation.identity,
            asset_ids,
            phase: plan.phase,
            paid,
            owed,
            overpaid,
        })
    }
}

/// The sale/access-control engine.
#[derive(Debug)]
pub struct SaleEngine<R, P, C> {
    inner: RwLock<Inner<R, P>>,
    clock: C,
    metrics: EngineMetrics,
}

impl<R, P, C> SaleEngine<R, P, C>
where
    R: AssetRegistry,
    P: PayoutRail,
    C: Clock,
{
    /// Build an engine around an existing state (fresh or restored).
    pub fn new(state: EngineState, registry: R, rail: P, clock: C) -> Result<Self, SaleError> {
        state.validate()?;
        tracing::info!(
            admin = %state.admin,
            beneficiary = %state.settlement.beneficiary(),
            sale_start = %state.config.sale_start_time,
            commitment = %state.commitment,
            "sale engine initialised"
        );
        Ok(Self {
            inner: RwLock::new(Inner {
                state,
                registry,
                rail,
            }),
            clock,
            metrics: EngineMetrics::new(),
        })
    }

    // ── Mutating operations ─────────────────────────────────────────

    /// Mint during the allow-list phase.
    pub fn whitelist_mint(
        &self,
        identity: Identity,
        quantity: u64,
        proof: &MembershipProof,
        payment: Amount,
    ) -> Result<MintReceipt, SaleError> {
        self.mint_with(MintKind::Whitelist, |state, now| {
            state.plan_whitelist_mint(now, identity, quantity, proof, payment)
        })
    }

    /// Mint during the public phase.
    pub fn public_mint(
        &self,
        identity: Identity,
        quantity: u64,
        payment: Amount,
    ) -> Result<MintReceipt, SaleError> {
        self.mint_with(MintKind::Public, |state, now| {
            state.plan_public_mint(now, identity, quantity, payment)
        })
    }

    /// Administrator issue with no payment, once the sale is over.
    pub fn gift(
        &self,
        caller: Identity,
        recipient: Identity,
        quantity: u64,
    ) -> Result<MintReceipt, SaleError> {
        self.mint_with(MintKind::Gift, |state, now| {
            state.plan_gift(now, &caller, recipient, quantity)
        })
    }

    pub fn set_sale_start_time(&self, caller: Identity, start: Timestamp) -> Result<(), SaleError> {
        self.admin_update(caller, "set_sale_start_time", false, |state| {
            state.config.sale_start_time = start;
            Ok(())
        })
    }

    /// Replace the allow-list commitment. Outstanding proofs against the old
    /// commitment stop verifying immediately.
    pub fn set_merkle_root(&self, caller: Identity, commitment: Commitment) -> Result<(), SaleError> {
        self.admin_update(caller, "set_merkle_root", false, |state| {
            state.commitment = commitment;
            Ok(())
        })
    }

    pub fn set_base_uri(&self, caller: Identity, base_uri: impl Into<String>) -> Result<(), SaleError> {
        let base_uri = base_uri.into();
        self.admin_update(caller, "set_base_uri", false, |state| {
            if base_uri.trim().is_empty() {
                return Err(mintgate_state::ConfigError::EmptyBaseUri.into());
            }
            state.config.base_uri = base_uri;
            Ok(())
        })
    }

    /// Pause or unpause. Always permitted for the administrator.
    pub fn set_pause(&self, caller: Identity, paused: bool) -> Result<(), SaleError> {
        self.admin_update(caller, "set_pause", true, |state| {
            state.config.paused = paused;
            Ok(())
        })
    }

    /// Send the entire custodied balance to the beneficiary. Permitted
    /// while paused. Custody is only debited once the rail accepts.
    pub fn release_all(&self, caller: Identity) -> Result<ReleaseRecord, SaleError> {
        let now = self.clock.now();
        let result = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;
            Self::release_locked(inner, &caller, now)
        };
        match &result {
            Ok(record) => {
                self.metrics.record_release();
                tracing::info!(
                    beneficiary = %record.beneficiary,
                    amount = %record.amount,
                    "custody released"
                );
            }
            Err(e) => self.reject("release_all", e),
        }
        result
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// The current phase.
    pub fn step(&self) -> Phase {
        let now = self.clock.now();
        self.inner.read().state.phase_at(now)
    }

    /// The current phase as 0..=5.
    pub fn step_ordinal(&self) -> u8 {
        self.step().ordinal()
    }

    pub fn boundaries(&self) -> PhaseBoundaries {
        self.inner.read().state.boundaries()
    }

    pub fn sale_start_time(&self) -> Timestamp {
        self.inner.read().state.config.sale_start_time
    }

    pub fn merkle_root(&self) -> Commitment {
        self.inner.read().state.commitment
    }

    pub fn base_uri(&self) -> String {
        self.inner.read().state.config.base_uri.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.read().state.config.paused
    }

    /// Assets issued through the engine, gifts included.
    pub fn total_supply(&self) -> u64 {
        self.inner.read().state.quota.issued()
    }

    pub fn balance_of(&self, owner: &Identity) -> u64 {
        self.inner.read().registry.balance_of(owner)
    }

    pub fn tokens_of_owner(&self, owner: &Identity) -> Vec<AssetId> {
        self.inner.read().registry.tokens_of_owner(owner)
    }

    pub fn owner_of(&self, asset_id: AssetId) -> Option<Identity> {
        self.inner.read().registry.owner_of(asset_id)
    }

    /// `base_uri + id + ".json"` once revealed, the placeholder before.
    pub fn token_uri(&self, asset_id: AssetId) -> Result<String, SaleError> {
        let now = self.clock.now();
        let inner = self.inner.read();
        if inner.registry.owner_of(asset_id).is_none() {
            return Err(SaleError::NonexistentAsset { asset_id });
        }
        Ok(inner.state.token_uri(now, asset_id.get()))
    }

    pub fn custodied_balance(&self) -> Amount {
        self.inner.read().state.settlement.custodied()
    }

    pub fn quota_of(&self, identity: &Identity) -> IdentityQuota {
        self.inner.read().state.quota.quota_of(identity)
    }

    /// A consistent copy of the full state.
    pub fn snapshot(&self) -> EngineState {
        self.inner.read().state.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Read access to the registry under the shared lock.
    pub fn with_registry<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.inner.read().registry)
    }

    /// Read access to the payout rail under the shared lock.
    pub fn with_rail<T>(&self, f: impl FnOnce(&P) -> T) -> T {
        f(&self.inner.read().rail)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn mint_with(
        &self,
        kind: MintKind,
        plan: impl FnOnce(&EngineState, Timestamp) -> Result<MintPlan, SaleError>,
    ) -> Result<MintReceipt, SaleError> {
        let now = self.clock.now();
        let result = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;
            plan(&inner.state, now).and_then(|p| inner.execute(p))
        };
        match &result {
            Ok(receipt) => {
                let quantity = receipt.asset_ids.len() as u64;
                self.metrics.record_mint(kind, quantity);
                tracing::info!(
                    kind = %kind,
                    recipient = %receipt.recipient,
                    quantity,
                    phase = %receipt.phase,
                    paid = %receipt.paid,
                    "assets minted"
                );
            }
            Err(e) => self.reject(operation_name(kind), e),
        }
        result
    }

    fn admin_update(
        &self,
        caller: Identity,
        operation: &'static str,
        allowed_while_paused: bool,
        apply: impl FnOnce(&mut EngineState) -> Result<(), SaleError>,
    ) -> Result<(), SaleError> {
        let result = {
            let mut guard = self.inner.write();
            let state = &mut guard.state;
            state.authorize(&caller, operation).and_then(|()| {
                if !allowed_while_paused {
                    state.ensure_unpaused(operation)?;
                }
                apply(state)
            })
        };
        match &result {
            Ok(()) => {
                self.metrics.record_admin_update();
                tracing::info!(operation, "configuration updated");
            }
            Err(e) => self.reject(operation, e),
        }
        result
    }

    fn release_locked(
        inner: &mut Inner<R, P>,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<ReleaseRecord, SaleError> {
        inner.state.authorize(caller, "release_all")?;
        let pending = inner.state.settlement.plan_release()?;
        inner.rail.transfer(pending.beneficiary, pending.amount)?;
        Ok(inner.state.settlement.commit_release(pending, now))
    }

    fn reject(&self, operation: &'static str, err: &SaleError) {
        self.metrics.record_rejection(err.code());
        match err {
            SaleError::Unauthorized { caller, .. } => {
                tracing::warn!(operation, caller = %caller, "unauthorized call rejected");
            }
            SaleError::Registry(_) | SaleError::Payout(_) => {
                tracing::warn!(operation, error = %err, "downstream failure, nothing committed");
            }
            _ => {
                tracing::debug!(operation, code = err.code(), error = %err, "call rejected");
            }
        }
    }
}

fn operation_name(kind: MintKind) -> &'static str {
    match kind {
        MintKind::Whitelist => "whitelist_mint",
        MintKind::Public => "public_mint",
        MintKind::Gift => "gift",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rail::LedgerRail;
    use crate::registry::InMemoryRegistry;
    use mintgate_crypto::MembershipTree;
    use mintgate_state::SaleConfig;
    use std::sync::Arc;

    const H: i64 = 3_600;

    fn id(n: u8) -> Identity {
        Identity::from_bytes([n; 20])
    }

    fn start() -> Timestamp {
        Timestamp::parse("2026-01-01T00:00:00Z").unwrap()
    }

    fn engine() -> (
        SaleEngine<InMemoryRegistry, LedgerRail, Arc<ManualClock>>,
        Arc<ManualClock>,
    ) {
        let tree = MembershipTree::build([id(1), id(2)]).unwrap();
        let state = EngineState::new(
            SaleConfig::new(start(), "ipfs://CID/"),
            tree.commitment(),
            id(0xad),
            id(0xbe),
        )
        .unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let engine = SaleEngine::new(
            state,
            InMemoryRegistry::new(),
            LedgerRail::new(),
            Arc::clone(&clock),
        )
        .unwrap();
        (engine, clock)
    }

    #[test]
    fn test_step_follows_clock() {
        let (engine, clock) = engine();
        assert_eq!(engine.step(), Phase::Whitelist);
        clock.advance(25 * H).unwrap();
        assert_eq!(engine.step_ordinal(), 3);
    }

    #[test]
    fn test_public_mint_assigns_sequential_ids() {
        let (engine, clock) = engine();
        clock.advance(25 * H).unwrap();
        let receipt = engine
            .public_mint(id(5), 2, Amount(6_000_000_000_000_000))
            .unwrap();
        assert_eq!(receipt.asset_ids, vec![AssetId(1), AssetId(2)]);
        assert_eq!(engine.balance_of(&id(5)), 2);
        assert_eq!(engine.owner_of(AssetId(2)), Some(id(5)));
        assert_eq!(engine.metrics().public_mints, 1);
    }

    #[test]
    fn test_rejection_is_counted() {
        let (engine, _) = engine();
        let err = engine.public_mint(id(5), 1, Amount::ZERO).unwrap_err();
        assert_eq!(err.code(), "PublicSaleNotActivated");
        assert_eq!(engine.metrics().rejections["PublicSaleNotActivated"], 1);
    }

    #[test]
    fn test_token_uri_unknown_asset() {
        let (engine, _) = engine();
        assert_eq!(
            engine.token_uri(AssetId(1)),
            Err(SaleError::NonexistentAsset { asset_id: AssetId(1) })
        );
    }

    #[test]
    fn test_set_base_uri_rejects_empty() {
        let (engine, _) = engine();
        let err = engine.set_base_uri(id(0xad), "").unwrap_err();
        assert_eq!(err.code(), "InvalidConfig");
        assert_eq!(engine.base_uri(), "ipfs://CID/");
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SaleEngine<InMemoryRegistry, LedgerRail, Arc<ManualClock>>>();
    }
}
