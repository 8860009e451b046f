//! # Digest: 32-Byte SHA-256 Values
//!
//! Defines `Digest`, the fixed-size value used for allow-list leaves,
//! interior tree nodes, and the published membership commitment.
//!
//! ## Ordering
//!
//! `Digest` orders lexicographically by its bytes. The membership tree
//! relies on this ordering to pair siblings without recording which side
//! each sibling sits on.
//!
//! ## Text Form
//!
//! `0x` followed by 64 lowercase hex characters (66 characters total).
//! Parsing accepts either case and an optional `0x` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use crate::error::CoreError;

/// Length in bytes of every digest in the system.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Parse from hex text, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_hex::<DIGEST_LEN>(s)
            .map(Self)
            .map_err(|reason| CoreError::InvalidDigest {
                input: s.to_string(),
                reason,
            })
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", encode_hex(&self.0))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 digest of raw bytes.
pub fn sha256(data: &[u8]) -> Digest {
    use sha2::Digest as _;
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&hash);
    Digest(bytes)
}

/// Encode bytes as lowercase hex without a prefix.
pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode exactly `N` bytes from hex text with an optional `0x` prefix.
pub(crate) fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, hex.len()));
    }
    let mut out = [0u8; N];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).map_err(|e| format!("invalid hex: {e}"))?;
        out[i] = u8::from_str_radix(pair, 16).map_err(|e| format!("invalid hex at byte {i}: {e}"))?;
    }
    Ok(out)
}
