//! # mintgate-crypto: Allow-List Cryptography
//!
//! Provides the membership primitives for the sale engine:
//!
//! - **Membership verification** of an identity against a published
//!   commitment, given a compact sibling proof. Pure, never errors.
//! - **Offline tree construction** (`MembershipTree`) used by operators to
//!   compute the commitment and per-identity proofs from a list of
//!   eligible identities. The engine never builds trees.
//!
//! ## Crate Policy
//!
//! - Depends only on `mintgate-core` internally.
//! - No mocking of cryptographic operations in tests; all tests use real
//!   SHA-256.

pub mod error;
pub mod merkle;

pub use error::CryptoError;
pub use merkle::{
    leaf_hash, node_hash, verify, Commitment, MembershipProof, MembershipTree, MAX_PROOF_DEPTH,
};
