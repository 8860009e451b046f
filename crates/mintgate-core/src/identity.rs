//! # Identity Newtypes
//!
//! Newtype wrappers for the two identifiers the sale engine handles: the
//! caller identity (a 20-byte account key) and the numbered asset id.
//! These prevent accidental identifier confusion: you cannot pass an
//! `AssetId` where a quantity is expected.
//!
//! ## Security Invariant
//!
//! Identity equality is byte-exact. Text forms that differ only in letter
//! case or `0x` prefix parse to the same identity; everything downstream
//! (quota maps, allow-list leaves, admin checks) compares bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::{decode_hex, encode_hex};
use crate::error::CoreError;

/// Width of an identity key in bytes.
pub const IDENTITY_LEN: usize = 20;

/// Opaque, globally unique caller reference (account key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(pub [u8; IDENTITY_LEN]);

impl Identity {
    /// Wrap raw identity bytes.
    pub fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Parse from hex text, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_hex::<IDENTITY_LEN>(s)
            .map(Self)
            .map_err(|reason| CoreError::InvalidIdentity {
                input: s.to_string(),
                reason,
            })
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", encode_hex(&self.0))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Identity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Sequential number of an issued asset. The first issued asset is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Access the inner number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
