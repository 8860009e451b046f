//! # Ledger Audit
//!
//! Consistency checks for ledgers that did not reach their current value
//! through `commit`, such as a state restored from a snapshot. A ledger
//! built only from planned reservations always passes.

use thiserror::Error;

use mintgate_core::{Amount, Identity};

/// A restored ledger that no sequence of accepted operations could produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("issued {issued} exceeds total supply cap {cap}")]
    TotalSupplyExceeded { issued: u64, cap: u64 },

    #[error("sold {sold} exceeds sale supply cap {cap}")]
    SaleSupplyExceeded { sold: u64, cap: u64 },

    #[error("allow-list mints {minted} exceed allow-list supply cap {cap}")]
    WhitelistSupplyExceeded { minted: u64, cap: u64 },

    #[error("{identity} holds {minted} allow-list mints, cap {cap}")]
    IdentityWhitelistCapExceeded {
        identity: Identity,
        minted: u64,
        cap: u64,
    },

    #[error("{identity} holds {minted} mints, cap {cap}")]
    IdentityCapExceeded {
        identity: Identity,
        minted: u64,
        cap: u64,
    },

    /// `issued` disagrees with the per-identity counts plus gifts.
    #[error("issued {issued} does not match {counted} counted across identities and gifts")]
    IssuedMismatch { issued: u64, counted: u128 },

    #[error("custody {custodied} does not equal received {received} minus released {released}")]
    CustodyMismatch {
        custodied: Amount,
        received: Amount,
        released: Amount,
    },
}
