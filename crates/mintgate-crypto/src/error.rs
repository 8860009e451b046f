//! # Crypto Error Types
//!
//! Only offline tree construction can fail. Verification reports a plain
//! `false` for every malformed or non-matching proof.

use thiserror::Error;

/// Error in allow-list tree construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A membership tree needs at least one identity.
    #[error("cannot build a membership tree from an empty identity set")]
    EmptySet,

    /// A proof element or commitment could not be decoded.
    #[error("digest error: {0}")]
    DigestError(String),
}
