//! # Time Source
//!
//! Every phase computation in the engine reads exactly one `now` per call
//! from a [`Clock`].

use std::sync::Arc;

use parking_lot::Mutex;

use mintgate_core::{CoreError, Timestamp};

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute time. Moving backwards is allowed.
    pub fn set(&self, at: Timestamp) {
        *self.now.lock() = at;
    }

    /// Move forward (or backward, for negative `secs`).
    pub fn advance(&self, secs: i64) -> Result<Timestamp, CoreError> {
        let mut now = self.now.lock();
        let target = now.epoch_secs().checked_add(secs).ok_or_else(|| {
            CoreError::InvalidTimestamp(format!("advancing by {secs}s overflows"))
        })?;
        *now = Timestamp::from_epoch_secs(target)?;
        Ok(*now)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        let later = clock.advance(3_600).unwrap();
        assert_eq!(later.to_iso8601(), "2026-01-01T01:00:00Z");
        clock.advance(-7_200).unwrap();
        assert_eq!(clock.now().to_iso8601(), "2025-12-31T23:00:00Z");
    }

    #[test]
    fn test_manual_clock_overflow_leaves_time_unchanged() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let clock = ManualClock::new(start);
        assert!(clock.advance(i64::MAX).is_err());
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_shared_clock_sees_updates() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let view: Arc<ManualClock> = Arc::clone(&clock);
        clock.advance(10).unwrap();
        assert_eq!(view.now().epoch_secs(), start.epoch_secs() + 10);
    }
}
