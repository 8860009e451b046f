//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only, seconds-precision instant. The sale
//! start time and every "now" fed to the phase clock are `Timestamp`s, so
//! all phase arithmetic happens in whole seconds on a single time scale.
//!
//! ## Invariant
//!
//! Non-UTC text inputs are **rejected** by [`Timestamp::parse()`]: there is
//! no silent offset conversion that could shift a phase boundary by hours.
//! Fractional seconds are rejected too. Deserialization goes through
//! `parse`, so config files and scripts obey the same rules.
//! [`Timestamp::parse_lenient()`] exists for operator convenience in the CLI.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::from_epoch_secs()`]: from Unix seconds.
/// - [`Timestamp::parse()`]: from an RFC 3339 string with `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp. Only the `Z` suffix and whole seconds
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if the string is not valid
    /// RFC 3339, carries an explicit offset (even `+00:00`), or has a
    /// fractional second.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        if dt.nanosecond() != 0 {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must be whole seconds, got: {s:?}"
            )));
        }
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Parse an RFC 3339 timestamp with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("unix seconds out of range: {secs}")))?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
    }

    #[test]
    fn test_parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-dateZ").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_parse_fractional_seconds_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00.750Z").is_err());
        assert_eq!(
            Timestamp::parse_lenient("2026-01-15T12:00:00.750Z").unwrap(),
            Timestamp::parse("2026-01-15T12:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_deserialize_enforces_parse_rules() {
        let ts: Timestamp = serde_json::from_str("\"2026-01-01T00:00:00Z\"").unwrap();
        assert_eq!(ts, Timestamp::parse("2026-01-01T00:00:00Z").unwrap());
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2026-01-01T00:00:00Z\"");

        assert!(serde_json::from_str::<Timestamp>("\"2026-01-01T05:00:00+05:00\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("\"2026-01-01T00:00:00.750Z\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("\"2026-01-01T05:00:00.750+05:00\"").is_err());
    }

    #[test]
    fn test_epoch_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap(), ts);
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }
}
