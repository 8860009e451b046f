//! # Quota Ledger
//!
//! Per-identity mint counts plus the global `issued` and `gifted`
//! counters. Every cap in the sale is enforced here.
//!
//! ## Plan and commit
//!
//! `plan_mint` and `plan_gift` take `&self`. Each returns either a
//! [`QuotaError`] or a [`Reservation`] that describes exactly which counters
//! move. `commit` applies a reservation and cannot fail. The engine holds a
//! single write lock from plan to commit, so a reservation is never stale
//! when applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgate_core::Identity;

use crate::audit::LedgerError;
use crate::phase::Phase;

// ─── Limits ──────────────────────────────────────────────────────────

/// Per-identity and global caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaLimits {
    /// Max assets one identity may mint in the allow-list phase.
    pub max_per_identity_whitelist: u64,
    /// Max assets one identity may hold from allow-list and public mints combined.
    pub max_per_identity_public: u64,
    /// Max assets in a single public mint call.
    pub max_per_call_public: u64,
    /// Max assets issued by the end of the allow-list phase.
    pub max_whitelist_supply: u64,
    /// Max assets issued by allow-list and public mints together.
    pub max_sale_supply: u64,
    /// Hard cap on all issued assets, gifts included.
    pub max_total_supply: u64,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            max_per_identity_whitelist: 1,
            max_per_identity_public: 4,
            max_per_call_public: 3,
            max_whitelist_supply: 2,
            max_sale_supply: 8,
            max_total_supply: 10,
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// Mint counts for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityQuota {
    pub whitelist_minted: u64,
    pub public_minted: u64,
}

impl IdentityQuota {
    /// Allow-list plus public mints.
    pub fn total(&self) -> u64 {
        self.whitelist_minted.saturating_add(self.public_minted)
    }
}

/// Which allowance a reservation draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MintKind {
    Whitelist,
    Public,
    Gift,
}

impl std::fmt::Display for MintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Whitelist => "whitelist",
            Self::Public => "public",
            Self::Gift => "gift",
        };
        f.write_str(s)
    }
}

/// An approved, not yet applied, change to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub kind: MintKind,
    /// The minting identity, or the gift recipient.
    pub identity: Identity,
    pub quantity: u64,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Reasons a reservation is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// Zero assets requested.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The mint kind is not open in this phase.
    #[error("{kind} mint not allowed in phase {phase}")]
    WrongPhase { kind: MintKind, phase: Phase },

    /// The identity would exceed its per-identity cap.
    #[error("{kind} mint for {identity} exceeds per-identity cap: already {already}, requested {requested}, cap {cap}")]
    AmountPerWalletExceeded {
        kind: MintKind,
        identity: Identity,
        already: u64,
        requested: u64,
        cap: u64,
    },

    /// A supply cap would be exceeded.
    #[error("supply cap exceeded: issued {issued}, requested {requested}, cap {cap}")]
    MaxSupplyExceeded { issued: u64, requested: u64, cap: u64 },

    /// Gifts are only allowed once the sale is over.
    #[error("gift not allowed in phase {phase}")]
    GiftNotAllowed { phase: Phase },
}

// ─── Ledger ──────────────────────────────────────────────────────────

/// Per-identity and global mint accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLedger {
    per_identity: BTreeMap<Identity, IdentityQuota>,
    issued: u64,
    gifted: u64,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total assets issued, gifts included.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Assets issued by gift.
    pub fn gifted(&self) -> u64 {
        self.gifted
    }

    /// Counts for one identity (zero if it never minted).
    pub fn quota_of(&self, identity: &Identity) -> IdentityQuota {
        self.per_identity.get(identity).copied().unwrap_or_default()
    }

    /// Number of identities that have minted.
    pub fn identity_count(&self) -> usize {
        self.per_identity.len()
    }

    /// Check a paid mint without changing anything.
    pub fn plan_mint(
        &self,
        kind: MintKind,
        identity: Identity,
        quantity: u64,
        phase: Phase,
        limits: &QuotaLimits,
    ) -> Result<Reservation, QuotaError> {
        if quantity == 0 {
            return Err(QuotaError::ZeroQuantity);
        }
        let current = self.quota_of(&identity);
        let (already, identity_cap, supply_cap) = match (kind, phase) {
            (MintKind::Whitelist, Phase::Whitelist) => (
                current.whitelist_minted,
                limits.max_per_identity_whitelist,
                limits.max_whitelist_supply,
            ),
            (MintKind::Public, Phase::Public) => (
                current.total(),
                limits.max_per_identity_public,
                limits.max_sale_supply,
            ),
            (MintKind::Gift, _) => return self.plan_gift(identity, quantity, phase, limits),
            _ => return Err(QuotaError::WrongPhase { kind, phase }),
        };

        if exceeds(already, quantity, identity_cap) {
            return Err(QuotaError::AmountPerWalletExceeded {
                kind,
                identity,
                already,
                requested: quantity,
                cap: identity_cap,
            });
        }
        self.check_supply(quantity, supply_cap.min(limits.max_total_supply))?;

        Ok(Reservation {
            kind,
            identity,
            quantity,
        })
    }

    /// Check a gift without changing anything.
    pub fn plan_gift(
        &self,
        recipient: Identity,
        quantity: u64,
        phase: Phase,
        limits: &QuotaLimits,
    ) -> Result<Reservation, QuotaError> {
        if quantity == 0 {
            return Err(QuotaError::ZeroQuantity);
        }
        if !phase.is_sale_over() {
            return Err(QuotaError::GiftNotAllowed { phase });
        }
        self.check_supply(quantity, limits.max_total_supply)?;
        Ok(Reservation {
            kind: MintKind::Gift,
            identity: recipient,
            quantity,
        })
    }

    /// Apply a reservation produced by `plan_mint` or `plan_gift`.
    pub fn commit(&mut self, reservation: Reservation) {
        let q = reservation.quantity;
        self.issued = self.issued.saturating_add(q);
        match reservation.kind {
            MintKind::Whitelist => {
                let entry = self.per_identity.entry(reservation.identity).or_default();
                entry.whitelist_minted = entry.whitelist_minted.saturating_add(q);
            }
            MintKind::Public => {
                let entry = self.per_identity.entry(reservation.identity).or_default();
                entry.public_minted = entry.public_minted.saturating_add(q);
            }
            MintKind::Gift => {
                self.gifted = self.gifted.saturating_add(q);
            }
        }
    }

    /// Plan and commit a paid mint in one step.
    pub fn reserve(
        &mut self,
        kind: MintKind,
        identity: Identity,
        quantity: u64,
        phase: Phase,
        limits: &QuotaLimits,
    ) -> Result<Reservation, QuotaError> {
        let reservation = self.plan_mint(kind, identity, quantity, phase, limits)?;
        self.commit(reservation);
        Ok(reservation)
    }

    /// Plan and commit a gift in one step.
    pub fn reserve_gift(
        &mut self,
        recipient: Identity,
        quantity: u64,
        phase: Phase,
        limits: &QuotaLimits,
    ) -> Result<Reservation, QuotaError> {
        let reservation = self.plan_gift(recipient, quantity, phase, limits)?;
        self.commit(reservation);
        Ok(reservation)
    }

    /// Iterate over identities and their counts, ordered by identity.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &IdentityQuota)> {
        self.per_identity.iter()
    }

    /// Check a restored ledger against `limits`.
    pub fn audit(&self, limits: &QuotaLimits) -> Result<(), LedgerError> {
        let counted = self
            .per_identity
            .values()
            .map(|q| u128::from(q.whitelist_minted) + u128::from(q.public_minted))
            .sum::<u128>()
            + u128::from(self.gifted);
        if counted != u128::from(self.issued) {
            return Err(LedgerError::IssuedMismatch {
                issued: self.issued,
                counted,
            });
        }
        if self.issued > limits.max_total_supply {
            return Err(LedgerError::TotalSupplyExceeded {
                issued: self.issued,
                cap: limits.max_total_supply,
            });
        }
        let sold = self.issued - self.gifted;
        if sold > limits.max_sale_supply {
            return Err(LedgerError::SaleSupplyExceeded {
                sold,
                cap: limits.max_sale_supply,
            });
        }

        let mut whitelist_minted = 0u64;
        for (identity, q) in &self.per_identity {
            if q.whitelist_minted > limits.max_per_identity_whitelist {
                return Err(LedgerError::IdentityWhitelistCapExceeded {
                    identity: *identity,
                    minted: q.whitelist_minted,
                    cap: limits.max_per_identity_whitelist,
                });
            }
            if q.total() > limits.max_per_identity_public {
                return Err(LedgerError::IdentityCapExceeded {
                    identity: *identity,
                    minted: q.total(),
                    cap: limits.max_per_identity_public,
                });
            }
            whitelist_minted = whitelist_minted.saturating_add(q.whitelist_minted);
        }
        if whitelist_minted > limits.max_whitelist_supply {
            return Err(LedgerError::WhitelistSupplyExceeded {
                minted: whitelist_minted,
                cap: limits.max_whitelist_supply,
            });
        }
        Ok(())
    }

    fn check_supply(&self, quantity: u64, cap: u64) -> Result<(), QuotaError> {
        if exceeds(self.issued, quantity, cap) {
            return Err(QuotaError::MaxSupplyExceeded {
                issued: self.issued,
                requested: quantity,
                cap,
            });
        }
        Ok(())
    }
}

/// `base + add > cap`, with overflow counted as exceeding.
fn exceeds(base: u64, add: u64, cap: u64) -> bool {
    match base.checked_add(add) {
        Some(sum) => sum > cap,
        None => true,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
