//! # Payout Rail Seam
//!
//! Moves released funds to the beneficiary. The engine debits custody only
//! after `transfer` returns `Ok`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgate_core::{Amount, Identity};

/// Failures reported by a payout rail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: Identity,
        amount: Amount,
        reason: String,
    },
}

/// Destination for released funds.
pub trait PayoutRail {
    fn transfer(&mut self, to: Identity, amount: Amount) -> Result<(), PayoutError>;
}

/// A rail that credits an in-memory balance per recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRail {
    credited: BTreeMap<Identity, Amount>,
    transfers: Vec<(Identity, Amount)>,
}

impl LedgerRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to `to` so far.
    pub fn credited(&self, to: &Identity) -> Amount {
        self.credited.get(to).copied().unwrap_or(Amount::ZERO)
    }

    /// Every transfer, in order.
    pub fn transfers(&self) -> &[(Identity, Amount)] {
        &self.transfers
    }
}

impl PayoutRail for LedgerRail {
    fn transfer(&mut self, to: Identity, amount: Amount) -> Result<(), PayoutError> {
        let balance = self.credited(&to);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| PayoutError::TransferFailed {
                to,
                amount,
                reason: format!("recipient balance {balance} would overflow"),
            })?;
        self.credited.insert(to, updated);
        self.transfers.push((to, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credits_accumulate() {
        let to = Identity::from_bytes([0xbe; 20]);
        let mut rail = LedgerRail::new();
        rail.transfer(to, Amount(5)).unwrap();
        rail.transfer(to, Amount(7)).unwrap();
        assert_eq!(rail.credited(&to), Amount(12));
        assert_eq!(rail.transfers().len(), 2);
    }

    #[test]
    fn test_overflow_rejected_without_side_effects() {
        let to = Identity::from_bytes([0xbe; 20]);
        let mut rail = LedgerRail::new();
        rail.transfer(to, Amount(u128::MAX)).unwrap();
        assert!(rail.transfer(to, Amount(1)).is_err());
        assert_eq!(rail.credited(&to), Amount(u128::MAX));
        assert_eq!(rail.transfers().len(), 1);
    }
}
