//! # Error Types: Primitive Parsing and Validation
//!
//! Errors raised while constructing core value types from untrusted text
//! (CLI arguments, config files, JSON snapshots). All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error constructing a core primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Identity text is not 20 bytes of hex.
    #[error("invalid identity {input:?}: {reason}")]
    InvalidIdentity {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Digest text is not 32 bytes of hex.
    #[error("invalid digest {input:?}: {reason}")]
    InvalidDigest {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Amount text is not a non-negative integer in smallest units.
    #[error("invalid amount {0:?}: expected a non-negative integer in smallest units")]
    InvalidAmount(String),

    /// Timestamp text or epoch value could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
