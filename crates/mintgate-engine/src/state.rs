//! # Engine State
//!
//! The single owned record behind the engine's lock: sale config, current
//! allow-list commitment, administrator, quota ledger, and settlement
//! ledger.
//!
//! All decisions are made here, on `&self`, and produce a [`MintPlan`].
//! [`EngineState::commit`] applies a plan and cannot fail. The check order
//! of every plan matches the rejection precedence callers observe.

use serde::{Deserialize, Serialize};

use mintgate_core::{Amount, Identity, Timestamp};
use mintgate_crypto::{verify, Commitment, MembershipProof};
use mintgate_state::{
    MintKind, Phase, PhaseBoundaries, QuotaLedger, Reservation, SaleConfig, SettlementLedger,
    SettlementReceipt,
};

use crate::error::SaleError;

/// Persisted sale state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub config: SaleConfig,
    pub commitment: Commitment,
    pub admin: Identity,
    pub quota: QuotaLedger,
    pub settlement: SettlementLedger,
}

/// An approved mint or gift, ready to be issued and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintPlan {
    pub phase: Phase,
    pub reservation: Reservation,
    /// `None` for gifts.
    pub settlement: Option<SettlementReceipt>,
}

impl EngineState {
    /// Fresh state. Fails if the config does not validate.
    pub fn new(
        config: SaleConfig,
        commitment: Commitment,
        admin: Identity,
        beneficiary: Identity,
    ) -> Result<Self, SaleError> {
        config.validate()?;
        Ok(Self {
            config,
            commitment,
            admin,
            quota: QuotaLedger::new(),
            settlement: SettlementLedger::new(beneficiary),
        })
    }

    /// Re-validate a state loaded from a snapshot: the config, every
    /// supply and per-identity cap, and the custody equation.
    pub fn validate(&self) -> Result<(), SaleError> {
        self.config.validate()?;
        self.quota.audit(&self.config.limits)?;
        self.settlement.audit()?;
        Ok(())
    }

    pub fn phase_at(&self, now: Timestamp) -> Phase {
        self.config
            .schedule
            .phase_at(self.config.sale_start_time, now)
    }

    pub fn boundaries(&self) -> PhaseBoundaries {
        self.config.schedule.boundaries(self.config.sale_start_time)
    }

    /// Reject callers other than the administrator.
    pub fn authorize(&self, caller: &Identity, operation: &'static str) -> Result<(), SaleError> {
        if *caller != self.admin {
            return Err(SaleError::Unauthorized {
                caller: *caller,
                operation,
            });
        }
        Ok(())
    }

    pub fn ensure_unpaused(&self, operation: &'static str) -> Result<(), SaleError> {
        if self.config.paused {
            return Err(SaleError::ContractPaused { operation });
        }
        Ok(())
    }

    /// Check an allow-list mint.
    pub fn plan_whitelist_mint(
        &self,
        now: Timestamp,
        identity: Identity,
        quantity: u64,
        proof: &MembershipProof,
        payment: Amount,
    ) -> Result<MintPlan, SaleError> {
        self.ensure_unpaused("whitelist_mint")?;
        let phase = self.phase_at(now);
        if phase != Phase::Whitelist {
            return Err(SaleError::WhitelistSaleNotActivated { phase });
        }
        if !verify(&identity, proof, &self.commitment) {
            return Err(SaleError::NotWhitelisted { identity });
        }
        let reservation = self.quota.plan_mint(
            MintKind::Whitelist,
            identity,
            quantity,
            phase,
            &self.config.limits,
        )?;
        let receipt = self
            .settlement
            .quote(quantity, payment, self.config.whitelist_price)?;
        Ok(MintPlan {
            phase,
            reservation,
            settlement: Some(receipt),
        })
    }

    /// Check a public mint.
    pub fn plan_public_mint(
        &self,
        now: Timestamp,
        identity: Identity,
        quantity: u64,
        payment: Amount,
    ) -> Result<MintPlan, SaleError> {
        self.ensure_unpaused("public_mint")?;
        let phase = self.phase_at(now);
        if phase != Phase::Public {
            return Err(SaleError::PublicSaleNotActivated { phase });
        }
        let per_call = self.config.limits.max_per_call_public;
        if quantity > per_call {
            return Err(SaleError::AmountNftPerWalletExceeded {
                identity,
                already: 0,
                requested: quantity,
                cap: per_call,
            });
        }
        let reservation = self.quota.plan_mint(
            MintKind::Public,
            identity,
            quantity,
            phase,
            &self.config.limits,
        )?;
        let receipt = self
            .settlement
            .quote(quantity, payment, self.config.public_price)?;
        Ok(MintPlan {
            phase,
            reservation,
            settlement: Some(receipt),
        })
    }

    /// Check an administrator gift.
    pub fn plan_gift(
        &self,
        now: Timestamp,
        caller: &Identity,
        recipient: Identity,
        quantity: u64,
    ) -> Result<MintPlan, SaleError> {
        self.authorize(caller, "gift")?;
        self.ensure_unpaused("gift")?;
        let phase = self.phase_at(now);
        let reservation = self
            .quota
            .plan_gift(recipient, quantity, phase, &self.config.limits)?;
        Ok(MintPlan {
            phase,
            reservation,
            settlement: None,
        })
    }

    /// Apply a plan. Only call after the registry has issued the assets.
    pub fn commit(&mut self, plan: &MintPlan) {
        self.quota.commit(plan.reservation);
        if let Some(receipt) = &plan.settlement {
            self.settlement.commit(receipt);
        }
    }

    /// URI for an existing asset id.
    pub fn token_uri(&self, now: Timestamp, asset_id: u64) -> String {
        if self.phase_at(now).is_revealed() {
            format!("{}{}.json", self.config.base_uri, asset_id)
        } else {
            self.config.placeholder_uri.clone()
        }
    }
}
