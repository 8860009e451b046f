//! # Sale Error Taxonomy
//!
//! Every rejection the engine can return. Each variant carries the state
//! at the time of failure (phase, counts, caps) so an operator can
//! diagnose it without logs. A rejection never changes state.

use thiserror::Error;

use mintgate_core::{Amount, AssetId, Identity};
use mintgate_state::{ConfigError, LedgerError, MintKind, Phase, QuotaError, SettlementError};

use crate::rail::PayoutError;
use crate::registry::RegistryError;

/// Errors returned by [`SaleEngine`](crate::SaleEngine) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    #[error("whitelist sale not activated (phase {phase})")]
    WhitelistSaleNotActivated { phase: Phase },

    #[error("public sale not activated (phase {phase})")]
    PublicSaleNotActivated { phase: Phase },

    #[error("{identity} is not whitelisted")]
    NotWhitelisted { identity: Identity },

    /// Per-identity cap, or the per-call cap in the public sale.
    #[error("amount per wallet exceeded for {identity}: already {already}, requested {requested}, cap {cap}")]
    AmountNftPerWalletExceeded {
        identity: Identity,
        already: u64,
        requested: u64,
        cap: u64,
    },

    #[error("max supply exceeded: issued {issued}, requested {requested}, cap {cap}")]
    MaxSupplyExceeded { issued: u64, requested: u64, cap: u64 },

    #[error("not enough funds: {quantity} x {price} required, {paid} paid")]
    NotEnoughFunds {
        quantity: u64,
        price: Amount,
        paid: Amount,
    },

    #[error("gift not allowed before the sale is over (phase {phase})")]
    GiftNotAllowed { phase: Phase },

    #[error("contract is paused: {operation} refused")]
    ContractPaused { operation: &'static str },

    #[error("{caller} is not authorized to {operation}")]
    Unauthorized {
        caller: Identity,
        operation: &'static str,
    },

    #[error("nothing to release")]
    NothingToRelease,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("nonexistent asset {asset_id}")]
    NonexistentAsset { asset_id: AssetId },

    #[error("custody overflow: holding {custodied}, received {paid}")]
    CustodyOverflow { custodied: Amount, paid: Amount },

    #[error("invalid sale config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// A restored state breaks a cap or the custody equation.
    #[error("corrupt sale state: {0}")]
    CorruptState(#[from] LedgerError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("payout: {0}")]
    Payout(#[from] PayoutError),
}

impl SaleError {
    /// Stable short name, used as a metrics key and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WhitelistSaleNotActivated { .. } => "WhitelistSaleNotActivated",
            Self::PublicSaleNotActivated { .. } => "PublicSaleNotActivated",
            Self::NotWhitelisted { .. } => "NotWhitelisted",
            Self::AmountNftPerWalletExceeded { .. } => "AmountNFTPerWalletExceeded",
            Self::MaxSupplyExceeded { .. } => "MaxSupplyExceeded",
            Self::NotEnoughFunds { .. } => "NotEnoughFunds",
            Self::GiftNotAllowed { .. } => "GiftNotAllowed",
            Self::ContractPaused { .. } => "ContractPaused",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::NothingToRelease => "NothingToRelease",
            Self::InvalidQuantity => "InvalidQuantity",
            Self::NonexistentAsset { .. } => "NonexistentAsset",
            Self::CustodyOverflow { .. } => "CustodyOverflow",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::CorruptState(_) => "CorruptState",
            Self::Registry(_) => "Registry",
            Self::Payout(_) => "Payout",
        }
    }
}

impl From<QuotaError> for SaleError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::ZeroQuantity => Self::InvalidQuantity,
            QuotaError::WrongPhase {
                kind: MintKind::Whitelist,
                phase,
            } => Self::WhitelistSaleNotActivated { phase },
            QuotaError::WrongPhase {
                kind: MintKind::Public,
                phase,
            } => Self::PublicSaleNotActivated { phase },
            QuotaError::WrongPhase {
                kind: MintKind::Gift,
                phase,
            }
            | QuotaError::GiftNotAllowed { phase } => Self::GiftNotAllowed { phase },
            QuotaError::AmountPerWalletExceeded {
                identity,
                already,
                requested,
                cap,
                ..
            } => Self::AmountNftPerWalletExceeded {
                identity,
                already,
                requested,
                cap,
            },
            QuotaError::MaxSupplyExceeded {
                issued,
                requested,
                cap,
            } => Self::MaxSupplyExceeded {
                issued,
                requested,
                cap,
            },
        }
    }
}

impl From<SettlementError> for SaleError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::NotEnoughFunds {
                quantity,
                price,
                paid,
            } => Self::NotEnoughFunds {
                quantity,
                price,
                paid,
            },
            SettlementError::NothingToRelease => Self::NothingToRelease,
            SettlementError::CustodyOverflow { custodied, paid } => {
                Self::CustodyOverflow { custodied, paid }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_phase_maps_per_kind() {
        let err: SaleError = QuotaError::WrongPhase {
            kind: MintKind::Public,
            phase: Phase::Between,
        }
        .into();
        assert_eq!(err, SaleError::PublicSaleNotActivated { phase: Phase::Between });
        assert_eq!(err.code(), "PublicSaleNotActivated");
    }

    #[test]
    fn test_per_wallet_code_spelling() {
        let err = SaleError::AmountNftPerWalletExceeded {
            identity: Identity::from_bytes([1; 20]),
            already: 1,
            requested: 1,
            cap: 1,
        };
        assert_eq!(err.code(), "AmountNFTPerWalletExceeded");
    }

    #[test]
    fn test_zero_quantity_maps_to_invalid_quantity() {
        assert_eq!(SaleError::from(QuotaError::ZeroQuantity), SaleError::InvalidQuantity);
    }

    #[test]
    fn test_display_carries_context() {
        let err = SaleError::MaxSupplyExceeded {
            issued: 10,
            requested: 1,
            cap: 10,
        };
        assert_eq!(
            err.to_string(),
            "max supply exceeded: issued 10, requested 1, cap 10"
        );
    }
}
