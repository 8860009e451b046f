//! # Settlement Ledger
//!
//! Validates payments against `quantity × price`, holds accepted funds in
//! custody, and releases the whole custodied balance to a fixed
//! beneficiary.
//!
//! Overpayment is retained. The [`SettlementReceipt`] records what was
//! owed and how much was paid on top, so an integrator can refund the
//! difference outside the engine.
//!
//! The ledger keeps `custodied == total_received - total_released` at all
//! times, and a release history in the manner of an escrow transaction log.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgate_core::{Amount, Identity, Timestamp};

use crate::audit::LedgerError;

/// Outcome of an accepted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub quantity: u64,
    /// Price per asset.
    pub price: Amount,
    /// `quantity × price`.
    pub owed: Amount,
    /// Amount actually paid and taken into custody.
    pub paid: Amount,
    /// `paid - owed`.
    pub overpaid: Amount,
}

/// A release approved by [`SettlementLedger::plan_release`], not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRelease {
    pub beneficiary: Identity,
    pub amount: Amount,
}

/// One completed release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub beneficiary: Identity,
    pub amount: Amount,
    pub released_at: Timestamp,
}

/// Settlement failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// Payment below `quantity × price`, or the product overflowed.
    #[error("not enough funds: {quantity} x {price} required, {paid} paid")]
    NotEnoughFunds {
        quantity: u64,
        price: Amount,
        paid: Amount,
    },

    /// Release requested with nothing in custody.
    #[error("nothing to release")]
    NothingToRelease,

    /// Accepting the payment would overflow the custody counters.
    #[error("custody overflow: holding {custodied}, received {paid}")]
    CustodyOverflow { custodied: Amount, paid: Amount },
}

/// Custodied funds and release history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLedger {
    beneficiary: Identity,
    custodied: Amount,
    total_received: Amount,
    total_released: Amount,
    #[serde(default)]
    releases: Vec<ReleaseRecord>,
}

impl SettlementLedger {
    /// An empty ledger paying out to `beneficiary`.
    pub fn new(beneficiary: Identity) -> Self {
        Self {
            beneficiary,
            custodied: Amount::ZERO,
            total_received: Amount::ZERO,
            total_released: Amount::ZERO,
            releases: Vec::new(),
        }
    }

    pub fn beneficiary(&self) -> Identity {
        self.beneficiary
    }

    /// Funds currently held.
    pub fn custodied(&self) -> Amount {
        self.custodied
    }

    pub fn total_received(&self) -> Amount {
        self.total_received
    }

    pub fn total_released(&self) -> Amount {
        self.total_released
    }

    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }

    /// Check a payment without taking custody.
    pub fn quote(
        &self,
        quantity: u64,
        paid: Amount,
        price: Amount,
    ) -> Result<SettlementReceipt, SettlementError> {
        let not_enough = SettlementError::NotEnoughFunds {
            quantity,
            price,
            paid,
        };
        let owed = price.checked_mul(quantity).ok_or_else(|| not_enough.clone())?;
        let overpaid = paid.checked_sub(owed).ok_or(not_enough)?;
        if self.custodied.checked_add(paid).is_none()
            || self.total_received.checked_add(paid).is_none()
        {
            return Err(SettlementError::CustodyOverflow {
                custodied: self.custodied,
                paid,
            });
        }
        Ok(SettlementReceipt {
            quantity,
            price,
            owed,
            paid,
            overpaid,
        })
    }

    /// Take a quoted payment into custody.
    pub fn commit(&mut self, receipt: &SettlementReceipt) {
        self.custodied = self.custodied.saturating_add(receipt.paid);
        self.total_received = self.total_received.saturating_add(receipt.paid);
    }

    /// Quote and commit in one step.
    pub fn settle(
        &mut self,
        quantity: u64,
        paid: Amount,
        price: Amount,
    ) -> Result<SettlementReceipt, SettlementError> {
        let receipt = self.quote(quantity, paid, price)?;
        self.commit(&receipt);
        Ok(receipt)
    }

    /// Prepare to release the whole balance.
    pub fn plan_release(&self) -> Result<PendingRelease, SettlementError> {
        if self.custodied.is_zero() {
            return Err(SettlementError::NothingToRelease);
        }
        Ok(PendingRelease {
            beneficiary: self.beneficiary,
            amount: self.custodied,
        })
    }

    /// Debit custody once the transfer has been made.
    pub fn commit_release(&mut self, pending: PendingRelease, at: Timestamp) -> ReleaseRecord {
        self.custodied = self
            .custodied
            .checked_sub(pending.amount)
            .unwrap_or(Amount::ZERO);
        self.total_released = self.total_released.saturating_add(pending.amount);
        let record = ReleaseRecord {
            beneficiary: pending.beneficiary,
            amount: pending.amount,
            released_at: at,
        };
        self.releases.push(record.clone());
        record
    }

    /// Check `custodied == total_received - total_released` on a restored
    /// ledger.
    pub fn audit(&self) -> Result<(), LedgerError> {
        let expected = self.total_received.checked_sub(self.total_released);
        if expected != Some(self.custodied) {
            return Err(LedgerError::CustodyMismatch {
                custodied: self.custodied,
                received: self.total_received,
                released: self.total_released,
            });
        }
        Ok(())
    }

    /// Plan and commit a release in one step.
    pub fn release(&mut self, at: Timestamp) -> Result<ReleaseRecord, SettlementError> {
        let pending = self.plan_release()?;
        Ok(self.commit_release(pending, at))
    }
}
