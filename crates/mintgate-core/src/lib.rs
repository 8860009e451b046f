//! # mintgate-core: Foundational Types for the Sale Engine
//!
//! This crate is the leaf of the mintgate dependency graph. It defines the
//! primitive value types every other crate speaks in, so that a payment
//! amount can never be passed where an asset count is expected and an
//! identity can never be confused with a digest.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Identity`, `AssetId`,
//!    `Amount`, `Digest`. No bare integers or byte arrays cross a crate
//!    boundary.
//!
//! 2. **Byte-exact identities.** `Identity` is a fixed 20-byte key with
//!    byte-exact equality. Its textual form is `0x`-prefixed lowercase hex.
//!
//! 3. **Checked money.** `Amount` only exposes checked arithmetic. An
//!    overflowing price computation is a rejection, never a wrap.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision,
//!    the single unit all phase arithmetic is done in.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mintgate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod amount;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::Amount;
pub use digest::{sha256, Digest, DIGEST_LEN};
pub use error::CoreError;
pub use identity::{AssetId, Identity, IDENTITY_LEN};
pub use temporal::Timestamp;
