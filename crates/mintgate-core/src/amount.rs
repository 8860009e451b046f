//! # Payment Amounts
//!
//! `Amount` is a count of the smallest payment unit (wei). Prices, payments,
//! and custodied balances are all `Amount`s.
//!
//! Only checked arithmetic is exposed. The sale engine treats an
//! overflowing `quantity × price` as an unpayable price rather than
//! silently wrapping to a small number.
//!
//! ## Serialization
//!
//! Amounts that fit in a `u64` serialize as plain integers; larger ones
//! serialize as decimal strings. Deserialization accepts either form, and
//! never needs a 128-bit integer from the format, so an `Amount` survives
//! buffering inside internally tagged or flattened documents.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A non-negative payment amount in smallest units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Construct from smallest units.
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// The inner value in smallest units.
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Checked multiplication by a quantity.
    pub fn checked_mul(self, quantity: u64) -> Option<Amount> {
        self.0.checked_mul(u128::from(quantity)).map(Amount)
    }

    /// Parse a decimal integer string of smallest units.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        s.trim()
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| CoreError::InvalidAmount(s.to_string()))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a non-negative integer or a decimal string of smallest units")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(Amount(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u128::try_from(v)
            .map(Amount)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}
