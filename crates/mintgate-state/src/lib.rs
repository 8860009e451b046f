//! # mintgate-state: Sale State and Accounting
//!
//! The persisted half of the sale engine, plus the pure phase clock that
//! interprets it.
//!
//! ## Components
//!
//! - **Phase** (`phase.rs`): six-phase sale clock
//!   `Before → Whitelist → Between → Public → Finished → Reveal`, a pure
//!   function of the current time, the configured start time, and four
//!   offsets. Never cached.
//!
//! - **Config** (`config.rs`): `SaleConfig`, the administrator-mutable
//!   sale parameters, with validation of the cap hierarchy.
//!
//! - **Quota** (`quota.rs`): per-identity mint counts and the global
//!   issued/gifted counters, with a pure `plan_*` step and an infallible
//!   `commit`.
//!
//! - **Settlement** (`settlement.rs`): payment validation against
//!   `quantity × price`, custody, and release of the whole balance to the
//!   fixed beneficiary.
//!
//! - **Audit** (`audit.rs`): `LedgerError`, returned when a restored
//!   ledger breaks a cap or the custody equation.
//!
//! ## Design
//!
//! Every ledger here separates *deciding* from *applying*. The `plan`/`quote`
//! methods take `&self` and return either a typed rejection or a value
//! describing the exact mutation; the `commit` methods take that value and
//! cannot fail. A caller holding one exclusive lock across plan and commit
//! therefore never leaves a partial write behind.

pub mod audit;
pub mod config;
pub mod phase;
pub mod quota;
pub mod settlement;

// ─── Phase re-exports ───────────────────────────────────────────────

pub use phase::{phase, Phase, PhaseBoundaries, PhaseSchedule};

pub use audit::LedgerError;

// ─── Config re-exports ──────────────────────────────────────────────

pub use config::{ConfigError, SaleConfig};

// ─── Quota re-exports ───────────────────────────────────────────────

pub use quota::{IdentityQuota, MintKind, QuotaError, QuotaLedger, QuotaLimits, Reservation};

// ─── Settlement re-exports ──────────────────────────────────────────

pub use settlement::{
    PendingRelease, ReleaseRecord, SettlementError, SettlementLedger, SettlementReceipt,
};
